use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::estimate::material::MaterialResult;
use crate::estimate::sealcoat::SealcoatResult;
use crate::estimate::striping::StripingResult;
use crate::estimate::Estimate;
use crate::performance::{PerformanceAlert, Severity};
use crate::store::SavedEstimate;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_estimate(estimate: &Estimate) -> String {
    let summary = match estimate {
        Estimate::Sealcoat(r) => render_sealcoat_summary(r),
        Estimate::Striping(r) => render_striping_summary(r),
        Estimate::Material(r) => render_material_summary(r),
    };
    format!("{summary}\n{}", render_line_items(estimate))
}

fn render_line_items(estimate: &Estimate) -> String {
    let mut table = new_table();
    table.set_header(vec!["Item", "Quantity", "Unit", "Cost"]);
    for item in estimate.line_items() {
        table.add_row(vec![
            item.label,
            format!("{:.2}", item.quantity),
            item.unit,
            format!("${:.2}", item.cost),
        ]);
    }
    table.add_row(Row::from(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("${:.2}", estimate.total_cost())).fg(Color::Green),
    ]));
    table.to_string()
}

fn render_sealcoat_summary(r: &SealcoatResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Sealcoat", "Value"]);
    table.add_row(vec!["Sealer".to_string(), r.sealer_type.to_string()]);
    table.add_row(vec!["Area (sq ft)".to_string(), format!("{:.2}", r.square_feet)]);
    table.add_row(vec!["Area (sq yd)".to_string(), format!("{:.2}", r.square_yards)]);
    table.add_row(vec!["Coats".to_string(), r.coats.to_string()]);
    table.add_row(vec![
        "Rate (gal/sq yd)".to_string(),
        format!("{} (recommended {})", r.application_rate, r.recommended_rate),
    ]);
    table.add_row(vec![
        "Mixed sealer (gal)".to_string(),
        format!("{:.2}", r.mixed_sealer_gallons),
    ]);
    table.add_row(vec![
        "Total mix (gal)".to_string(),
        format!("{:.2}", r.total_mix_gallons),
    ]);
    table.to_string()
}

fn render_striping_summary(r: &StripingResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Striping", "Value"]);
    table.add_row(vec![
        "Layout".to_string(),
        format!("{} rows x {} spaces", r.rows, r.spaces_per_row),
    ]);
    table.add_row(vec!["Total spaces".to_string(), r.total_spaces.to_string()]);
    table.add_row(vec!["ADA spaces".to_string(), r.ada_spaces.to_string()]);
    table.add_row(vec!["Linear feet".to_string(), format!("{:.2}", r.linear_feet)]);
    table.add_row(vec![
        "Painted area (sq ft)".to_string(),
        format!("{:.2}", r.total_area_sq_ft),
    ]);
    table.add_row(vec![
        "Gallons (white/yellow/blue)".to_string(),
        format!(
            "{:.2} / {:.2} / {:.2}",
            r.gallons.white, r.gallons.yellow, r.gallons.blue
        ),
    ]);
    table.to_string()
}

fn render_material_summary(r: &MaterialResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Zone", "Surface", "Mix", "Area (sq ft)", "Tons", "Asphalt (t)", "Mix Cost",
    ]);
    for (idx, zone) in r.zones.iter().enumerate() {
        table.add_row(vec![
            zone.name.clone().unwrap_or_else(|| format!("#{}", idx + 1)),
            zone.surface_type.to_string(),
            zone.mix_type.to_string(),
            format!("{:.2}", zone.area_sq_ft),
            format!("{:.2}", zone.tons),
            format!("{:.2}", zone.asphalt_tons),
            format!("${:.2}", zone.mix_cost),
        ]);
    }
    table.add_row(vec![
        "All zones".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", r.total_area_sq_ft),
        format!("{:.2}", r.total_tons),
        format!("{:.2}", r.asphalt_tons),
        format!("${:.2}", r.material_cost),
    ]);
    table.to_string()
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::DarkRed,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Grey,
    }
}

pub fn render_alerts_table(alerts: &[PerformanceAlert], score: u32) -> String {
    let mut table = new_table();
    table.set_header(vec!["#", "Metric", "Value", "Budget", "Ratio", "Severity"]);
    for alert in alerts {
        table.add_row(Row::from(vec![
            Cell::new(alert.sequence),
            Cell::new(&alert.metric),
            Cell::new(alert.value),
            Cell::new(alert.threshold),
            Cell::new(format!("{:.2}x", alert.ratio)),
            Cell::new(alert.severity.to_string().to_uppercase())
                .fg(severity_color(alert.severity)),
        ]));
    }
    format!("{table}\nPerformance score: {score}/100")
}

pub fn render_saved_table(saved: &[SavedEstimate]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Name", "Kind", "Saved", "Total"]);
    for item in saved {
        table.add_row(vec![
            item.name.clone(),
            item.estimate.kind().to_string(),
            item.saved_at.format("%Y-%m-%d %H:%M").to_string(),
            format!("${:.2}", item.estimate.total_cost()),
        ]);
    }
    table.to_string()
}
