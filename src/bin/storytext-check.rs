use std::env;
use std::fs;
use std::process;
use std::sync::OnceLock;

use regex::Regex;
use storytext::{render, RenderContext};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: storytext-check <file.html|file.txt>");
        eprintln!();
        eprintln!("Renders each content file with an empty context and reports");
        eprintln!("placeholder tokens that survive rendering unresolved.");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match check_file(file_path) {
            Ok(leftovers) if leftovers.is_empty() => {
                println!("✓ {} renders clean", file_path);
            }
            Ok(leftovers) => {
                eprintln!("✗ {} has unresolved tokens:", file_path);
                for token in leftovers {
                    eprintln!("    {}", token);
                }
                exit_code = 1;
            }
            Err(message) => {
                eprintln!("✗ {}: {}", file_path, message);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn check_file(path: &str) -> Result<Vec<String>, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read file: {}", e))?;

    let rendered = render(&content, &RenderContext::new());
    Ok(leftover_tokens(rendered.as_str()))
}

/// Placeholder-shaped text that survived rendering. Unknown tokens pass
/// through by design; for an authoring check they are worth flagging.
fn leftover_tokens(html: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid token pattern"));

    let mut found: Vec<String> = re.find_iter(html).map(|m| m.as_str().to_string()).collect();
    found.sort();
    found.dedup();
    found
}
