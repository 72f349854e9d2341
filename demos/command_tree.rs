//! Command tree dispatch example.
//!
//! Builds a small tree with aliases and a fallback usage task, validates it,
//! then routes a few argument vectors through it.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p toolbox-demos --example command_tree
//! ```

use toolbox_core::{Command, end_with_message};

fn main() {
    let root = Command::new("app")
        .with_task(end_with_message("Usage: app <greet|math> [args...]"))
        .with_sub_commands([
            Command::new("greet")
                .with_aliases(["hello", "hi"])
                .with_task(|args: &[String]| {
                    let who = if args.is_empty() { "world".to_string() } else { args.join(" ") };
                    println!("Hello, {who}!");
                    Ok(())
                }),
            Command::new("math")
                .with_task(end_with_message("Usage: app math <sum> <numbers...>"))
                .with_sub_commands([Command::new("sum").with_task(|args: &[String]| {
                    let mut total = 0i64;
                    for arg in args {
                        total += arg.parse::<i64>()?;
                    }
                    println!("sum = {total}");
                    Ok(())
                })]),
        ]);

    // Sibling collisions would make later commands unreachable.
    if let Err(errors) = root.validate() {
        for error in errors {
            eprintln!("invalid tree: {error}");
        }
        return;
    }

    let runs: [&[&str]; 6] = [
        &["greet"],
        &["hi", "Ada", "Lovelace"],
        &["math", "sum", "1", "2", "39"],
        &["math", "sum", "one"],
        &["math"],
        &["unknown"],
    ];

    for args in runs {
        println!("$ app {}", args.join(" "));
        match root.execute(args) {
            Ok(()) => println!("-> ok\n"),
            Err(err) => println!("-> error: {err}\n"),
        }
    }
}
