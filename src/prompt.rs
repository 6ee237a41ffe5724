//! Operator interaction
//!
//! Prompts are read line by line from an [`Operator`]; the terminal
//! implementation reads stdin, tests script the answers.

use std::io::{self, BufRead, Write};

/// Source of operator answers
pub trait Operator {
    /// Print `question` and return the answer without its line ending
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Operator reading answers from the terminal
#[derive(Debug, Default)]
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        println!();
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// `true` only for `y` (any case); an empty answer declines
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Ask a `[y/N]` question
pub fn confirm(operator: &mut dyn Operator, question: &str) -> io::Result<bool> {
    let answer = operator.ask(&format!("{} [y/N] ", question))?;
    Ok(is_yes(&answer))
}

/// Answer to the immediate-fill warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillChoice {
    Continue,
    StopLimit,
    Cancel,
}

impl FillChoice {
    /// `1` continues, `2` switches to stop-limit, anything else cancels
    pub fn parse(answer: &str) -> Self {
        match answer.trim() {
            "1" => FillChoice::Continue,
            "2" => FillChoice::StopLimit,
            _ => FillChoice::Cancel,
        }
    }
}

/// Text of the immediate-fill warning
pub fn immediate_fill_question(last_price: f64, side: &str, price_min: f64, quote: &str) -> String {
    format!(
        "\nActual price is {:.4} {}, your {} orders will start at {:.4}.\n\
         If you continue, the orders are going to be filled immediately\n\
         1) Continue\n\
         2) Use Stop-Limit orders\n\
         3) Cancel\n\
         Choice: ",
        last_price, quote, side, price_min
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes("Y"));
        assert!(is_yes(" y "));
        assert!(!is_yes(""));
        assert!(!is_yes("yes"));
        assert!(!is_yes("n"));
    }

    #[test]
    fn test_fill_choice_parse() {
        assert_eq!(FillChoice::parse("1"), FillChoice::Continue);
        assert_eq!(FillChoice::parse("2"), FillChoice::StopLimit);
        assert_eq!(FillChoice::parse(" 2\n"), FillChoice::StopLimit);
        assert_eq!(FillChoice::parse("3"), FillChoice::Cancel);
        assert_eq!(FillChoice::parse(""), FillChoice::Cancel);
        assert_eq!(FillChoice::parse("continue"), FillChoice::Cancel);
    }

    struct Answers(Vec<&'static str>, Vec<String>);

    impl Operator for Answers {
        fn ask(&mut self, question: &str) -> io::Result<String> {
            self.1.push(question.to_string());
            Ok(if self.0.is_empty() {
                String::new()
            } else {
                self.0.remove(0).to_string()
            })
        }
    }

    #[test]
    fn test_confirm_with_script() {
        let mut operator = Answers(vec!["y", "n"], Vec::new());
        assert!(confirm(&mut operator, "Do you want to continue?").unwrap());
        assert!(!confirm(&mut operator, "Do you want to continue?").unwrap());
        // script exhausted
        assert!(!confirm(&mut operator, "Again?").unwrap());
        assert_eq!(operator.1.len(), 3);
        assert_eq!(operator.1[0], "Do you want to continue? [y/N] ");
    }

    #[test]
    fn test_immediate_fill_question() {
        let question = immediate_fill_question(1.23456, "buy", 1.3, "USDT");
        assert!(question.contains("Actual price is 1.2346 USDT"));
        assert!(question.contains("your buy orders will start at 1.3000"));
        assert!(question.ends_with("Choice: "));
    }
}
