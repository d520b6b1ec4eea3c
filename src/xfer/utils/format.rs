/// Dimensione in kilobyte con due decimali, per elenchi e log
pub fn size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}
