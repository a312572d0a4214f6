//! Single Number visualizer CLI - play an XOR animation in the terminal.

use std::path::PathBuf;
use std::time::Duration;

use single_number_viz::{
    animation::{LogSink, SceneContent, SoundHookAdapter, TimelineEvent, VirtualScheduler},
    compute::{Analysis, to_binary},
    schema::{AnimationMode, FULL_BIT_WIDTH, InputArray, RandomInput, Speed, VisualizerConfig},
    visualizer::Visualizer,
};

fn usage(program: &str) {
    eprintln!("Usage: {program} [options] <values>");
    eprintln!();
    eprintln!("Play the Single Number XOR animation for a comma separated array.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  values             e.g. \"4,1,2,1,2\" (1-20 non-negative integers)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>    Visualizer configuration JSON");
    eprintln!("  --stepwise         One frame per element instead of the two-frame mode");
    eprintln!("  --speed <speed>    slow, medium or fast");
    eprintln!("  --random           Generate a valid random array instead of <values>");
    eprintln!("  --seed <n>         Seed for --random");
    eprintln!("  --json             Print every scene as JSON");
    eprintln!("  --example          Print the default configuration and exit");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// What the command line asks for.
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Example,
    Run(RunArgs),
}

#[derive(Debug, Default, PartialEq)]
struct RunArgs {
    config_path: Option<PathBuf>,
    stepwise: bool,
    speed: Option<Speed>,
    random: bool,
    seed: Option<u64>,
    json: bool,
    values: Vec<String>,
}

impl RunArgs {
    fn input(&self) -> Result<InputArray, String> {
        if self.random {
            return Ok(RandomInput {
                pairs: None,
                seed: self.seed,
            }
            .generate());
        }
        if self.values.is_empty() {
            return Err("no input values given".to_string());
        }
        self.values.join(",").parse::<InputArray>().map_err(|e| format!("{e}"))
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut run = RunArgs::default();

    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--example" => return Ok(Command::Example),
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => {
                let path = rest.next().ok_or("--config needs a path")?;
                run.config_path = Some(PathBuf::from(path));
            }
            "--speed" => {
                let raw = rest.next().ok_or("--speed needs a value")?;
                run.speed = Some(raw.parse::<Speed>().map_err(|e| format!("{e}"))?);
            }
            "--stepwise" => run.stepwise = true,
            "--json" => run.json = true,
            "--random" => run.random = true,
            "--seed" => {
                let raw = rest.next().ok_or("--seed needs a value")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|e| format!("invalid seed '{raw}': {e}"))?;
                run.seed = Some(seed);
            }
            other => run.values.push(other.to_string()),
        }
    }

    if run.seed.is_some() && !run.random {
        return Err("--seed only applies with --random".to_string());
    }
    if run.random && !run.values.is_empty() {
        return Err("--random cannot be combined with input values".to_string());
    }
    Ok(Command::Run(run))
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
        std::process::exit(1);
    }

    let run = match parse_args(&args[1..]).unwrap_or_else(|e| fail(e)) {
        Command::Help => {
            usage(&args[0]);
            return;
        }
        Command::Example => {
            print_example_config();
            return;
        }
        Command::Run(run) => run,
    };

    let mut config = match &run.config_path {
        Some(path) => VisualizerConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => VisualizerConfig::default(),
    };
    if run.stepwise {
        config.mode = AnimationMode::Stepwise;
    }
    if let Some(speed) = run.speed {
        config.speed = speed;
    }
    let json = run.json;
    let input = run.input().unwrap_or_else(|e| fail(e));

    let mut viz = Visualizer::new(config, input).unwrap_or_else(|e| fail(e));
    print_header(&viz);

    let mut scheduler = VirtualScheduler::new();
    let mut sound = SoundHookAdapter::new(LogSink);

    viz.play();
    let mut events = scheduler.advance(viz.timeline_mut(), Duration::ZERO);
    loop {
        sound.dispatch(&events);
        for event in &events {
            if let TimelineEvent::FrameChanged { frame } = *event {
                println!(
                    "[{:>6} ms] frame {}/{}",
                    scheduler.now().as_millis(),
                    frame,
                    viz.state().total_frames - 1
                );
                print_scene(&viz, frame, json);
            }
        }

        let Some(due) = scheduler.next_due() else {
            break;
        };
        events = scheduler.advance(viz.timeline_mut(), due - scheduler.now());
    }

    println!();
    println!(
        "Finished at frame {} after {:.1}s of playback",
        viz.state().frame,
        scheduler.now().as_secs_f32()
    );
}

fn print_header(viz: &Visualizer) {
    let config = viz.config();
    println!("Single Number XOR Visualizer");
    println!("============================");
    println!("Input: {:?}", viz.input().values());
    println!(
        "Mode: {:?}, speed: {} ({} frames)",
        config.mode,
        config.speed.label(),
        viz.state().total_frames
    );
    match viz.analysis() {
        Analysis::Valid { pairings, .. } => println!(
            "Singleton: {} at index {}, {} pairs",
            pairings.singleton.value,
            pairings.singleton.index,
            pairings.edges.len()
        ),
        Analysis::Invalid { violation } => println!("Invalid input: {violation}"),
    }
    println!();
}

fn print_scene(viz: &Visualizer, frame: usize, json: bool) {
    let scene = viz.scene_at(frame);
    if json {
        match serde_json::to_string_pretty(&scene) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error serializing scene: {e}"),
        }
        return;
    }

    match &scene.content {
        SceneContent::Initial {
            rows, connectors, ..
        } => {
            for row in rows {
                println!("  {:>10}  {}", row.value, row.binary);
            }
            for c in connectors {
                println!("  pair {} <-> {} ({})", c.edge.row_a, c.edge.row_b, c.edge.value);
            }
        }
        SceneContent::XorStep { step, rows, highlights } => {
            for row in rows {
                println!("  {:>10}  {}", row.value, row.binary);
            }
            let flipped: Vec<usize> = highlights.iter().map(|h| h.bit).collect();
            println!(
                "  {} ^ {} = {}   flipped bits {:?}",
                step.accumulator, step.operand, step.result, flipped
            );
        }
        SceneContent::Result { result, meteors, .. } => {
            println!(
                "  result {} = {} ({} meteors)",
                result.decimal,
                result.binary,
                meteors.len()
            );
            println!("  full width: {}", to_binary(result.value, FULL_BIT_WIDTH));
        }
        SceneContent::Diagnostic { diagnostic } => {
            println!(
                "  {} value(s) appear once: {:?}",
                diagnostic.singleton_count, diagnostic.singletons
            );
            for c in &diagnostic.invalid {
                println!("  {} appears {} times", c.value, c.count);
            }
        }
    }
}

fn print_example_config() {
    let config = VisualizerConfig {
        mode: AnimationMode::Stepwise,
        ..Default::default()
    };
    match serde_json::to_string_pretty(&config) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args)
    }

    fn run(args: &[&str]) -> RunArgs {
        match parse(args).unwrap() {
            Command::Run(run) => run,
            other => panic!("expected a run, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_value_is_not_a_seed() {
        let args = run(&["7"]);
        assert!(!args.random);
        assert_eq!(args.input().unwrap().values(), &[7]);

        // A trailing number next to --random is input, which conflicts.
        assert!(parse(&["--random", "7"]).is_err());
    }

    #[test]
    fn test_seed_is_explicit() {
        let args = run(&["--random", "--seed", "42"]);
        assert!(args.random);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.input().unwrap(), run(&["--seed", "42", "--random"]).input().unwrap());

        assert!(parse(&["--random", "--seed"]).is_err());
        assert!(parse(&["--random", "--seed", "abc"]).is_err());
        assert!(parse(&["--seed", "1", "4,1,4"]).is_err());
    }

    #[test]
    fn test_parse_options() {
        let args = run(&["--stepwise", "--speed", "fast", "--json", "4,1,2", "1,2"]);
        assert!(args.stepwise && args.json);
        assert_eq!(args.speed, Some(Speed::Fast));
        assert_eq!(args.input().unwrap().values(), &[4, 1, 2, 1, 2]);

        assert_eq!(parse(&["4", "--example"]), Ok(Command::Example));
        assert_eq!(parse(&["--help"]), Ok(Command::Help));
        assert!(parse(&["--speed", "warp"]).is_err());
        assert!(run(&[]).input().is_err());
    }
}
