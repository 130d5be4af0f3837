use anyhow::Result;

use crate::estimate::Estimate;
use crate::performance::PerformanceAlert;

pub fn estimate_to_csv(estimate: &Estimate) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["kind", "item", "quantity", "unit", "cost"])?;
    for item in estimate.line_items() {
        writer.write_record([
            estimate.kind().to_string(),
            item.label,
            format!("{:.2}", item.quantity),
            item.unit,
            format!("{:.2}", item.cost),
        ])?;
    }
    writer.write_record([
        estimate.kind().to_string(),
        "Total".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", estimate.total_cost()),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn alerts_to_csv(alerts: &[PerformanceAlert]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "sequence",
        "timestamp",
        "metric",
        "value",
        "threshold",
        "ratio",
        "severity",
    ])?;
    for alert in alerts {
        writer.write_record([
            alert.sequence.to_string(),
            alert.timestamp.to_rfc3339(),
            alert.metric.clone(),
            alert.value.to_string(),
            alert.threshold.to_string(),
            format!("{:.3}", alert.ratio),
            alert.severity.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::sealcoat::{estimate_sealcoat, SealcoatInput, SealcoatPricing};
    use crate::estimate::schema::SealerType;

    #[test]
    fn writes_line_items_and_total_row() {
        let result = estimate_sealcoat(
            &SealcoatInput::new(10_000.0, SealerType::CoalTar),
            &SealcoatPricing::default(),
        )
        .unwrap();
        let csv = estimate_to_csv(&result.into()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "kind,item,quantity,unit,cost");
        assert_eq!(lines[1], "sealcoat,Coal Tar concentrate,108.33,gal,200.42");
        assert_eq!(lines.last().copied(), Some("sealcoat,Total,,,261.67"));
    }
}
