//! Output formatting for CLI

use crate::types::PlayerState;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:24} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print one line per player
pub fn print_players(players: &[PlayerState]) {
    println!("  {:>8} {:>10} {:>12}", "player", "facility", "utility");
    for (player, state) in players.iter().enumerate() {
        println!(
            "  {:>8} {:>10} {:>12.2}",
            player, state.facility, state.utility
        );
    }
}

/// Compact rendering of a list of node ids
pub fn format_nodes(nodes: &[usize]) -> String {
    const SHOWN: usize = 20;
    let head: Vec<String> = nodes.iter().take(SHOWN).map(ToString::to_string).collect();
    if nodes.len() > SHOWN {
        format!("{} ... ({} total)", head.join(", "), nodes.len())
    } else {
        head.join(", ")
    }
}
