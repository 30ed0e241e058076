//! Line-oriented interactive session over stdin.

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use secded::ecc::format::{render_codeword, to_hex};
use secded::sim::Session;
use secded::{DataWidth, ErrorKind};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
commands:
  write <address> <data>   encode data (binary or 0x hex) and store it
  read <address>           load a stored word
  inject [position]        flip a bit of the active word (random if omitted)
  check                    detect and correct errors in the active word
  show                     print the active word
  width <8|16|32>          switch data width (clears memory)
  memory                   list stored words
  history                  list operations
  layout                   list data and parity positions
  help                     this text
  quit                     leave";

enum Flow {
    Continue,
    Quit,
}

pub fn run(width: DataWidth) -> Result<()> {
    let mut session = Session::new(width);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{} SEC-DED session, type 'help' for commands", width);
    loop {
        write!(stdout, "secded> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        match execute(&mut session, command, args) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {:#}", e),
        }
    }
    Ok(())
}

fn parse_number(text: Option<&&str>, what: &str) -> Result<usize> {
    let text = text.ok_or_else(|| anyhow!("missing {}", what))?;
    text.parse()
        .with_context(|| format!("{} must be a number, got {:?}", what, text))
}

fn execute(session: &mut Session, command: &str, args: &[&str]) -> Result<Flow> {
    match command {
        "write" | "w" => {
            let address = parse_number(args.first(), "address")?;
            if args.len() < 2 {
                return Err(anyhow!("missing data"));
            }
            let outcome = session.write(address, &args[1..].join(" "))?;
            if outcome.truncated {
                println!(
                    "warning: data exceeds {} bits, most significant bits dropped",
                    session.codec().data_bits()
                );
            }
            println!(
                "address {}: {} encoded as {}",
                outcome.address,
                to_hex(outcome.data),
                to_hex(outcome.encoded)
            );
            show(session);
        }
        "read" | "r" => {
            let address = parse_number(args.first(), "address")?;
            let active = session.read(address)?;
            println!(
                "address {}: encoded {}, original {}",
                address,
                to_hex(active.encoded),
                to_hex(active.original)
            );
            show(session);
        }
        "inject" | "i" => {
            let position = match args.first() {
                Some(_) => parse_number(args.first(), "position")?,
                None => rand::thread_rng().gen_range(0..session.codec().total_bits()),
            };
            session.inject(position)?;
            println!("bit {} flipped", position);
            show(session);
        }
        "check" | "c" => {
            let decoded = session.check()?;
            match decoded.kind {
                ErrorKind::None => println!("no error, data {}", to_hex(decoded.data)),
                ErrorKind::Single { position } => println!(
                    "single error at bit {} corrected, data {}",
                    position,
                    to_hex(decoded.data)
                ),
                ErrorKind::Double => {
                    println!("double error detected, cannot correct (syndrome {})", decoded.syndrome)
                }
            }
            show(session);
        }
        "show" | "s" => show(session),
        "width" => {
            let bits = parse_number(args.first(), "width")?;
            session.set_width(DataWidth::try_from(bits)?);
            println!(
                "{} data words, {} total bits",
                session.codec().width(),
                session.codec().total_bits()
            );
        }
        "memory" | "m" => {
            if session.memory().is_empty() {
                println!("memory is empty");
            }
            for (address, cell) in session.memory() {
                println!(
                    "{:>4}  encoded {:>14}  original {:>12}",
                    address,
                    to_hex(cell.encoded),
                    to_hex(cell.original)
                );
            }
        }
        "history" | "h" => {
            for entry in session.history().entries() {
                println!("{}", entry);
            }
        }
        "layout" | "l" => super::print_layout(session.codec()),
        "help" | "?" => println!("{}", HELP),
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => return Err(anyhow!("unknown command {:?}, try 'help'", other)),
    }
    Ok(Flow::Continue)
}

fn show(session: &Session) {
    match session.active() {
        Some(active) => println!(
            "{}",
            render_codeword(session.codec(), active.encoded, active.injected)
        ),
        None => println!("no active word"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secded::sim::Operation;

    #[test]
    fn test_write_truncates_oversized_data() {
        let mut session = Session::new(DataWidth::Bits8);
        let flow = execute(&mut session, "write", &["3", "0x1FF"]).unwrap();
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(session.memory().read(3).unwrap().original, 0xFF);
        assert_eq!(session.active().unwrap().address, 3);
    }

    #[test]
    fn test_write_joins_grouped_binary() {
        let mut session = Session::new(DataWidth::Bits8);
        execute(&mut session, "w", &["0", "1010", "0001"]).unwrap();
        assert_eq!(session.memory().read(0).unwrap().original, 0b1010_0001);
    }

    #[test]
    fn test_write_argument_errors() {
        let mut session = Session::new(DataWidth::Bits8);
        assert!(execute(&mut session, "write", &[]).is_err());
        assert!(execute(&mut session, "write", &["3"]).is_err());
        assert!(execute(&mut session, "write", &["three", "1"]).is_err());
        assert!(execute(&mut session, "write", &["5", "12"]).is_err());
        assert!(session.memory().is_empty());
    }

    #[test]
    fn test_inject_and_check_repair_memory() {
        let mut session = Session::new(DataWidth::Bits16);
        execute(&mut session, "write", &["7", "0x1A"]).unwrap();
        let encoded = session.active().unwrap().encoded;

        execute(&mut session, "inject", &["5"]).unwrap();
        assert_eq!(session.memory().read(7).unwrap().encoded, encoded ^ (1 << 5));

        execute(&mut session, "check", &[]).unwrap();
        assert_eq!(session.memory().read(7).unwrap().encoded, encoded);
        assert_eq!(
            session.history().last().map(|entry| entry.operation),
            Some(Operation::Corrected {
                position: 5,
                data: 0x1A
            })
        );
    }

    #[test]
    fn test_random_inject_stays_in_word() {
        let mut session = Session::new(DataWidth::Bits8);
        execute(&mut session, "write", &["0", "0x5A"]).unwrap();
        let encoded = session.active().unwrap().encoded;

        execute(&mut session, "inject", &[]).unwrap();
        let active = session.active().unwrap();
        let position = active.injected.unwrap();
        assert!(position < session.codec().total_bits());
        assert_eq!(active.encoded, encoded ^ (1 << position));
    }

    #[test]
    fn test_read_loads_stored_word() {
        let mut session = Session::new(DataWidth::Bits8);
        execute(&mut session, "write", &["1", "0x11"]).unwrap();
        execute(&mut session, "write", &["2", "0x22"]).unwrap();

        execute(&mut session, "read", &["1"]).unwrap();
        assert_eq!(session.active().unwrap().original, 0x11);
        assert!(execute(&mut session, "read", &["9"]).is_err());
        assert!(execute(&mut session, "read", &["4096"]).is_err());
    }

    #[test]
    fn test_inject_and_check_need_active_word() {
        let mut session = Session::new(DataWidth::Bits8);
        assert!(execute(&mut session, "inject", &["1"]).is_err());
        assert!(execute(&mut session, "check", &[]).is_err());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_width_switch_clears_memory() {
        let mut session = Session::new(DataWidth::Bits8);
        execute(&mut session, "write", &["3", "0x42"]).unwrap();

        execute(&mut session, "width", &["16"]).unwrap();
        assert_eq!(session.codec().total_bits(), 22);
        assert!(session.memory().is_empty());
        assert!(session.active().is_none());

        assert!(execute(&mut session, "width", &["12"]).is_err());
        assert_eq!(session.codec().width(), DataWidth::Bits16);
    }

    #[test]
    fn test_listing_commands_continue() {
        let mut session = Session::new(DataWidth::Bits8);
        for command in ["show", "memory", "history", "layout", "help"] {
            assert!(matches!(
                execute(&mut session, command, &[]).unwrap(),
                Flow::Continue
            ));
        }
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut session = Session::new(DataWidth::Bits8);
        let error = execute(&mut session, "frobnicate", &[]).err().unwrap();
        assert!(error.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_quit() {
        let mut session = Session::new(DataWidth::Bits8);
        for command in ["quit", "exit", "q"] {
            assert!(matches!(
                execute(&mut session, command, &[]).unwrap(),
                Flow::Quit
            ));
        }
    }
}
