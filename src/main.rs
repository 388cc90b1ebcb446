use rex2dfa::*;
use std::io::BufRead;
use std::process;

fn run(config: &Config, pattern: &str) -> Result<(), ParseError> {
    let nfa = regex::build(pattern)?;
    match config.stage {
        Stage::Nfa => println!("NFA:\n{}", nfa),
        Stage::Dfa => println!("DFA:\n{}", dfa::determinize(&nfa)),
        Stage::Minimal => println!("Minimized DFA:\n{}", convert(pattern, config.strategy)?),
    }
    if config.check {
        let by_partition = partition::minimize(&dfa::determinize(&nfa));
        let by_reversal = brzozowski::minimize(&nfa);
        println!(
            "partition: {} states, reversal: {} states, isomorphic: {:?}\n",
            by_partition.len(),
            by_reversal.len(),
            by_partition.isomorphic(&by_reversal)
        );
    }
    Ok(())
}

fn main() {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}\n{}", e, config::USAGE);
            process::exit(2);
        }
    };
    if config.help {
        println!("{}", config::USAGE);
        return;
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = run(&config, config::pattern_of(&line)) {
            println!("error: {}", e);
        }
    }
}
