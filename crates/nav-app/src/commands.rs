//! Parsing of the commands typed into the demo

use crate::screens::{DemoKey, SPLIT_TAGS};
use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Push(DemoKey),
    Replace(DemoKey),
    Root(DemoKey),
    Back,
    Pop,
    Split,
    ChildPush { tag: String, key: DemoKey },
    Pause,
    Resume,
    Save,
    Restore,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  push <key>                   navigate to a key (home, split, counter <n>)
  replace <key>                swap the top key
  root <key>                   reset the stack to a single key
  back                         route a back press through the engine tree
  pop                          pop the main stack
  split                        push the split screen
  child <top|bottom> push <key>
  pause | resume               background or foreground the window
  save                         save all engines to JSON
  restore                      recreate the window from the saved JSON
  show                         print stacks and the visible view
  quit";

fn parse_key(words: &[&str]) -> Result<DemoKey> {
    match words {
        ["home"] => Ok(DemoKey::Home),
        ["split"] => Ok(DemoKey::Split),
        ["counter"] => Ok(DemoKey::Counter(1)),
        ["counter", number] => {
            let number = number
                .parse()
                .map_err(|_| anyhow!("Counter number must be a positive integer, got {:?}", number))?;
            Ok(DemoKey::Counter(number))
        }
        [] => bail!("Missing key"),
        _ => bail!("Unknown key {:?}", words.join(" ")),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["push", key @ ..] => Command::Push(parse_key(key)?),
            ["replace", key @ ..] => Command::Replace(parse_key(key)?),
            ["root", key @ ..] => Command::Root(parse_key(key)?),
            ["back"] => Command::Back,
            ["pop"] => Command::Pop,
            ["split"] => Command::Split,
            ["child", tag, "push", key @ ..] => {
                if !SPLIT_TAGS.iter().any(|known| known == tag) {
                    bail!("Unknown pane {:?}, expected one of {:?}", tag, SPLIT_TAGS);
                }
                Command::ChildPush {
                    tag: tag.to_string(),
                    key: parse_key(key)?,
                }
            }
            ["pause"] => Command::Pause,
            ["resume"] => Command::Resume,
            ["save"] => Command::Save,
            ["restore"] => Command::Restore,
            ["show"] => Command::Show,
            ["help"] | ["?"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            _ => bail!("Unknown command {:?}, type help", line.trim()),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(Command::parse("push counter 3").unwrap(), Command::Push(DemoKey::Counter(3)));
        assert_eq!(Command::parse("  root home ").unwrap(), Command::Root(DemoKey::Home));
        assert_eq!(Command::parse("replace counter").unwrap(), Command::Replace(DemoKey::Counter(1)));
        assert_eq!(Command::parse("back").unwrap(), Command::Back);
    }

    #[test]
    fn test_parse_child_push() {
        assert_eq!(
            Command::parse("child bottom push counter 2").unwrap(),
            Command::ChildPush {
                tag: "bottom".to_string(),
                key: DemoKey::Counter(2),
            }
        );
        assert!(Command::parse("child left push home").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("push").is_err());
        assert!(Command::parse("push counter x").is_err());
        assert!(Command::parse("fly").is_err());
    }
}
