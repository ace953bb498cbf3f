use xcc_drv::{compile_file, parse_args, Action, CliError};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(run(&args));
}

fn run(args: &[String]) -> i32 {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            report_cli_error(&err);
            return 1;
        }
    };

    match parsed.action {
        Action::Help => {
            print!("{}", xcc_drv::HELP_TEXT);
            0
        }
        Action::Version => {
            println!("xcc {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Action::Compile => {
            let config = parsed.config;
            match compile_file(&config.input, &config.output, config.dump) {
                Ok(results) => {
                    for (name, contents) in &results.dumps {
                        println!("; -- {} --", name);
                        print!("{}", contents);
                    }
                    0
                }
                Err(err) => {
                    eprintln!("{}: error: {}", config.input.display(), err);
                    1
                }
            }
        }
    }
}

fn report_cli_error(err: &CliError) {
    eprintln!("xcc: error: {}", err);
    eprintln!("usage: xcc [OPTIONS] <input>, try -h for help");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_fails() {
        assert_eq!(run(&[]), 1);
    }

    #[test]
    fn help_flag_succeeds() {
        assert_eq!(run(&["-h".to_string()]), 0);
    }
}
