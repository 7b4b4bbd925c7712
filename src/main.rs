// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for asmoutline.

use std::io::{self, Write};

use clap::Parser;

use asmoutline::cli::{execute, Cli};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let use_color = std::env::var("NO_COLOR").is_err();

    match execute(&cli, use_color) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            let _ = write!(stdout, "{}", output.text);
            if !output.text.is_empty() && !output.text.ends_with('\n') {
                let _ = writeln!(stdout);
            }
            let _ = stdout.flush();
            if output.errors_reported {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }
}
