// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde::Serialize;
use sj_adapters::ScriptInfo;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty-print any serializable value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render the script list as aligned text rows.
pub fn format_scripts(scripts: &[ScriptInfo]) -> String {
    if scripts.is_empty() {
        return "No scripts available\n".to_string();
    }
    let width = scripts.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for script in scripts {
        let input = if script.requires_input { "input" } else { "-" };
        out.push_str(&format!(
            "{:<width$}  {:<5}  {}\n",
            crate::color::literal(&script.name),
            input,
            crate::color::muted(&script.label),
            width = width + color_overhead(&script.name)
        ));
    }
    out
}

/// Extra bytes the color escape adds, so padding lines up.
fn color_overhead(text: &str) -> usize {
    crate::color::literal(text).len() - text.len()
}

/// File name for a downloaded template: `Foo.py` -> `Template_Foo.xlsx`.
pub fn template_file_name(script: &str) -> String {
    format!("Template_{}.xlsx", script.trim_end_matches(".py"))
}
