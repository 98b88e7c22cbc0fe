use tabled::Tabled;

#[derive(Tabled)]
pub struct OperationRow {
    pub scenario: String,
    pub phase: String,
    pub total_operations: usize,
    #[tabled(display = "float2")]
    pub avg_time_ms: f64,
    #[tabled(display = "float2")]
    pub min_time_ms: f64,
    #[tabled(display = "float2")]
    pub max_time_ms: f64,
    pub transport_failures: usize,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}
