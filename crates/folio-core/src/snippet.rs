//! Code-snippet echo for blog demos.
//!
//! **This is not a sandbox.** Nothing is compiled or executed: the echo scans
//! the source text for print-style calls and replays their arguments as
//! "output". The denylist below is cosmetic and provides no isolation. Do not
//! expose this against untrusted input in production.

use std::str::FromStr;

use thiserror::Error;

use crate::error::DomainError;

/// Longest snippet accepted, in characters.
pub const MAX_SNIPPET_LENGTH: usize = 10_000;

/// Substrings that get a snippet rejected (case-insensitive).
pub const BLOCKED_PATTERNS: &[&str] = &[
    "require(",
    "import(",
    "eval(",
    "Function(",
    "setTimeout",
    "setInterval",
    "process.",
    "fs.",
    "child_process",
    "exec",
    "spawn",
];

const DEFAULT_PROMPT: &str = "Enter input:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnippetError {
    #[error("Code and language are required")]
    MissingInput,

    #[error("Code too long (max 10,000 characters)")]
    TooLong,

    #[error("Code contains potentially dangerous operations and cannot be executed")]
    Blocked,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl From<SnippetError> for DomainError {
    fn from(err: SnippetError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

/// Languages the echo understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Python,
    Java,
}

impl FromStr for Language {
    type Err = SnippetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" | "js" | "typescript" | "ts" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            _ => Err(SnippetError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Produce the simulated output of a snippet.
pub fn echo(code: &str, language: &str, user_inputs: &[String]) -> Result<String, SnippetError> {
    if code.trim().is_empty() || language.trim().is_empty() {
        return Err(SnippetError::MissingInput);
    }
    if code.chars().count() > MAX_SNIPPET_LENGTH {
        return Err(SnippetError::TooLong);
    }

    let lowered = code.to_lowercase();
    if BLOCKED_PATTERNS
        .iter()
        .any(|p| lowered.contains(&p.to_lowercase()))
    {
        return Err(SnippetError::Blocked);
    }

    let output = match language.parse::<Language>()? {
        Language::JavaScript => echo_javascript(code, user_inputs),
        Language::Python => echo_python(code),
        Language::Java => echo_java(code),
    };
    Ok(output)
}

fn echo_javascript(code: &str, user_inputs: &[String]) -> String {
    let mut calls = call_arguments(code, "console.log(")
        .into_iter()
        .map(|(pos, arg)| (pos, Call::Log(arg)))
        .chain(
            call_arguments(code, "prompt(")
                .into_iter()
                .map(|(pos, arg)| (pos, Call::Prompt(arg))),
        )
        .collect::<Vec<_>>();
    calls.sort_by_key(|(pos, _)| *pos);

    let mut inputs = user_inputs.iter();
    let lines: Vec<String> = calls
        .into_iter()
        .map(|(_, call)| match call {
            Call::Log(arg) => strip_quotes(&arg),
            Call::Prompt(arg) => {
                let message = match strip_quotes(&arg) {
                    m if m.is_empty() => DEFAULT_PROMPT.to_string(),
                    m => m,
                };
                match inputs.next() {
                    Some(input) => format!("> {message} {input}"),
                    None => format!("> {message} [No input provided]"),
                }
            }
        })
        .collect();

    if lines.is_empty() {
        "Code executed successfully (no output)".to_string()
    } else {
        lines.join("\n")
    }
}

fn echo_python(code: &str) -> String {
    let printed = call_arguments(code, "print(");
    if !printed.is_empty() {
        return join_stripped(printed);
    }
    if code.contains("for ") && code.contains("range(") {
        return "0\n1\n2\n3\n4".to_string();
    }
    "Python code executed successfully (simulated)".to_string()
}

fn echo_java(code: &str) -> String {
    let printed = call_arguments(code, "System.out.println(");
    if !printed.is_empty() {
        return join_stripped(printed);
    }
    "Java code executed successfully (simulated)".to_string()
}

enum Call {
    Log(String),
    Prompt(String),
}

/// Byte offset and raw argument text of every `opener ... )` call.
///
/// The argument runs to the first closing parenthesis; empty calls are skipped.
fn call_arguments(code: &str, opener: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(rel) = code[from..].find(opener) {
        let start = from + rel;
        let args_start = start + opener.len();
        match code[args_start..].find(')') {
            Some(len) if len > 0 => {
                found.push((start, code[args_start..args_start + len].to_string()));
                from = args_start + len + 1;
            }
            Some(_) => from = args_start + 1,
            None => break,
        }
    }

    found
}

fn strip_quotes(arg: &str) -> String {
    arg.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

fn join_stripped(args: Vec<(usize, String)>) -> String {
    args.iter()
        .map(|(_, arg)| strip_quotes(arg))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_print_is_echoed() {
        let out = echo("print('hello')\nprint(\"world\")", "python", &[]).unwrap();
        assert_eq!(out, "hello\nworld");
    }

    #[test]
    fn test_python_range_loop_is_simulated() {
        let out = echo("for i in range(5):\n    x = i", "py", &[]).unwrap();
        assert_eq!(out, "0\n1\n2\n3\n4");

        let out = echo("x = 1", "python", &[]).unwrap();
        assert_eq!(out, "Python code executed successfully (simulated)");
    }

    #[test]
    fn test_java_println_is_echoed() {
        let code = r#"class A { void m() { System.out.println("Hi"); } }"#;
        assert_eq!(echo(code, "Java", &[]).unwrap(), "Hi");
    }

    #[test]
    fn test_javascript_logs_and_prompts_in_order() {
        let code = "const n = prompt('Name?');\nconsole.log('hello');\nprompt('Age?');";
        let inputs = vec!["Ada".to_string()];

        let out = echo(code, "ts", &inputs).unwrap();

        assert_eq!(out, "> Name? Ada\nhello\n> Age? [No input provided]");
    }

    #[test]
    fn test_javascript_without_output() {
        assert_eq!(
            echo("let x = 1;", "js", &[]).unwrap(),
            "Code executed successfully (no output)"
        );
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        assert_eq!(
            echo("Process.exit(1)", "js", &[]),
            Err(SnippetError::Blocked)
        );
        assert_eq!(
            echo("print(EVAL('1'))", "python", &[]),
            Err(SnippetError::Blocked)
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(echo("", "js", &[]), Err(SnippetError::MissingInput));
        assert_eq!(
            echo(&"a".repeat(MAX_SNIPPET_LENGTH + 1), "js", &[]),
            Err(SnippetError::TooLong)
        );
        assert_eq!(
            echo("puts 1", "ruby", &[]),
            Err(SnippetError::UnsupportedLanguage("ruby".to_string()))
        );
    }
}
