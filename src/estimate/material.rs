use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::estimate::schema::{MixType, SurfaceType};
use crate::estimate::{require_non_negative, round2, EstimateError, LineItem};
use crate::tables::{
    default_mix_price_per_ton, mix_composition, ASPHALT_TONS_PER_CUBIC_FOOT,
    ASPHALT_TONS_PER_LABOR_HOUR, DEFAULT_AGGREGATE_PER_TON, DEFAULT_BINDER_PER_TON,
    DEFAULT_DELIVERY_PER_TRIP, DEFAULT_FUEL_SURCHARGE_PER_TON, DEFAULT_PAVING_LABOR_RATE,
    INCHES_PER_FOOT, TONS_PER_TRUCKLOAD,
};

/// One paving area. Length and width in feet, thickness in inches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ZoneSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub length: f64,
    pub width: f64,
    pub thickness: f64,
    #[serde(default)]
    pub surface_type: SurfaceType,
    pub mix_type: MixType,
}

impl ZoneSpec {
    pub fn new(length: f64, width: f64, thickness: f64, mix_type: MixType) -> Self {
        Self {
            name: None,
            length,
            width,
            thickness,
            surface_type: SurfaceType::New,
            mix_type,
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), EstimateError> {
        require_non_negative(&format!("zone {index} length"), self.length)?;
        require_non_negative(&format!("zone {index} width"), self.width)?;
        require_non_negative(&format!("zone {index} thickness"), self.thickness)?;
        Ok(())
    }
}

/// Parses `LENGTH,WIDTH,THICKNESS,MIX[,SURFACE]`.
impl FromStr for ZoneSpec {
    type Err = EstimateError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if !(4..=5).contains(&parts.len()) {
            return Err(EstimateError::Validation(format!(
                "zone must be LENGTH,WIDTH,THICKNESS,MIX[,SURFACE], got {raw:?}"
            )));
        }
        let number = |label: &str, value: &str| {
            value.parse::<f64>().map_err(|_| {
                EstimateError::Validation(format!("invalid zone {label} {value:?} in {raw:?}"))
            })
        };
        let mut zone = ZoneSpec::new(
            number("length", parts[0])?,
            number("width", parts[1])?,
            number("thickness", parts[2])?,
            MixType::from_str(parts[3])?,
        );
        if let Some(surface) = parts.get(4) {
            zone.surface_type = SurfaceType::from_str(surface)?;
        }
        Ok(zone)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixPrices {
    pub standard: f64,
    pub premium: f64,
    pub recycled: f64,
}

impl MixPrices {
    pub fn price_for(&self, mix: MixType) -> f64 {
        match mix {
            MixType::Standard => self.standard,
            MixType::Premium => self.premium,
            MixType::Recycled => self.recycled,
        }
    }
}

impl Default for MixPrices {
    fn default() -> Self {
        Self {
            standard: default_mix_price_per_ton(MixType::Standard),
            premium: default_mix_price_per_ton(MixType::Premium),
            recycled: default_mix_price_per_ton(MixType::Recycled),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialPricing {
    #[serde(default)]
    pub mix_per_ton: MixPrices,
    #[serde(default = "default_aggregate")]
    pub aggregate_per_ton: f64,
    #[serde(default = "default_binder")]
    pub binder_per_ton: f64,
    #[serde(default = "default_fuel_surcharge")]
    pub fuel_surcharge_per_ton: f64,
    #[serde(default = "default_delivery")]
    pub delivery_per_trip: f64,
    #[serde(default = "default_labor")]
    pub labor_per_hour: f64,
}

impl MaterialPricing {
    pub fn validate(&self) -> Result<(), EstimateError> {
        for mix in MixType::ALL {
            require_non_negative(
                &format!("{} price per ton", mix.as_slug()),
                self.mix_per_ton.price_for(mix),
            )?;
        }
        require_non_negative("aggregate_per_ton", self.aggregate_per_ton)?;
        require_non_negative("binder_per_ton", self.binder_per_ton)?;
        require_non_negative("fuel_surcharge_per_ton", self.fuel_surcharge_per_ton)?;
        require_non_negative("delivery_per_trip", self.delivery_per_trip)?;
        require_non_negative("labor_per_hour", self.labor_per_hour)?;
        Ok(())
    }
}

impl Default for MaterialPricing {
    fn default() -> Self {
        Self {
            mix_per_ton: MixPrices::default(),
            aggregate_per_ton: default_aggregate(),
            binder_per_ton: default_binder(),
            fuel_surcharge_per_ton: default_fuel_surcharge(),
            delivery_per_trip: default_delivery(),
            labor_per_hour: default_labor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneBreakdown {
    pub name: Option<String>,
    pub surface_type: SurfaceType,
    pub mix_type: MixType,
    pub area_sq_ft: f64,
    pub volume_cubic_ft: f64,
    pub tons: f64,
    pub asphalt_tons: f64,
    pub aggregate_tons: f64,
    pub binder_tons: f64,
    pub recycled_tons: Option<f64>,
    pub mix_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialResult {
    pub zones: Vec<ZoneBreakdown>,
    pub total_area_sq_ft: f64,
    pub total_volume_cubic_ft: f64,
    pub total_tons: f64,
    pub asphalt_tons: f64,
    pub aggregate_tons: f64,
    pub binder_tons: f64,
    pub delivery_trips: u64,
    pub labor_hours: f64,
    pub material_cost: f64,
    pub aggregate_cost: f64,
    pub binder_cost: f64,
    pub fuel_cost: f64,
    pub delivery_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
}

impl MaterialResult {
    pub fn line_items(&self) -> Vec<LineItem> {
        vec![
            LineItem::new("Asphalt mix", self.asphalt_tons, "ton", self.material_cost),
            LineItem::new("Aggregate", self.aggregate_tons, "ton", self.aggregate_cost),
            LineItem::new("Binder", self.binder_tons, "ton", self.binder_cost),
            LineItem::new("Fuel surcharge", self.total_tons, "ton", self.fuel_cost),
            LineItem::new(
                "Delivery",
                self.delivery_trips as f64,
                "trip",
                self.delivery_cost,
            ),
            LineItem::new("Labor", self.labor_hours, "hr", self.labor_cost),
        ]
    }
}

pub fn estimate_material(
    zones: &[ZoneSpec],
    pricing: &MaterialPricing,
) -> Result<MaterialResult, EstimateError> {
    if zones.is_empty() {
        return Err(EstimateError::Validation(
            "at least one zone is required".to_string(),
        ));
    }
    for (index, zone) in zones.iter().enumerate() {
        zone.validate(index)?;
    }
    pricing.validate()?;

    let mut breakdown = Vec::with_capacity(zones.len());
    let mut total_area = 0.0;
    let mut total_volume = 0.0;
    let mut total_tons = 0.0;
    let mut asphalt_tons = 0.0;
    let mut aggregate_tons = 0.0;
    let mut binder_tons = 0.0;
    let mut material_cost = 0.0;

    for zone in zones {
        let area = zone.length * zone.width;
        let volume = area * (zone.thickness / INCHES_PER_FOOT);
        let tons = volume * ASPHALT_TONS_PER_CUBIC_FOOT;
        let composition = mix_composition(zone.mix_type);
        let zone_asphalt = tons * composition.asphalt_fraction;
        let zone_aggregate = tons * composition.aggregate_fraction;
        let zone_binder = tons * composition.binding_fraction;
        let zone_mix_cost = zone_asphalt * pricing.mix_per_ton.price_for(zone.mix_type);

        total_area += area;
        total_volume += volume;
        total_tons += tons;
        asphalt_tons += zone_asphalt;
        aggregate_tons += zone_aggregate;
        binder_tons += zone_binder;
        material_cost += zone_mix_cost;

        breakdown.push(ZoneBreakdown {
            name: zone.name.clone(),
            surface_type: zone.surface_type,
            mix_type: zone.mix_type,
            area_sq_ft: round2(area),
            volume_cubic_ft: round2(volume),
            tons: round2(tons),
            asphalt_tons: round2(zone_asphalt),
            aggregate_tons: round2(zone_aggregate),
            binder_tons: round2(zone_binder),
            recycled_tons: composition
                .recycled_fraction
                .map(|fraction| round2(zone_asphalt * fraction)),
            mix_cost: round2(zone_mix_cost),
        });
    }

    let delivery_trips = (asphalt_tons / TONS_PER_TRUCKLOAD).ceil();
    let labor_hours = asphalt_tons / ASPHALT_TONS_PER_LABOR_HOUR;
    let aggregate_cost = aggregate_tons * pricing.aggregate_per_ton;
    let binder_cost = binder_tons * pricing.binder_per_ton;
    let fuel_cost = total_tons * pricing.fuel_surcharge_per_ton;
    let delivery_cost = delivery_trips * pricing.delivery_per_trip;
    let labor_cost = labor_hours * pricing.labor_per_hour;
    let total_cost =
        material_cost + aggregate_cost + binder_cost + fuel_cost + delivery_cost + labor_cost;

    Ok(MaterialResult {
        zones: breakdown,
        total_area_sq_ft: round2(total_area),
        total_volume_cubic_ft: round2(total_volume),
        total_tons: round2(total_tons),
        asphalt_tons: round2(asphalt_tons),
        aggregate_tons: round2(aggregate_tons),
        binder_tons: round2(binder_tons),
        delivery_trips: delivery_trips as u64,
        labor_hours: round2(labor_hours),
        material_cost: round2(material_cost),
        aggregate_cost: round2(aggregate_cost),
        binder_cost: round2(binder_cost),
        fuel_cost: round2(fuel_cost),
        delivery_cost: round2(delivery_cost),
        labor_cost: round2(labor_cost),
        total_cost: round2(total_cost),
    })
}

fn default_aggregate() -> f64 {
    DEFAULT_AGGREGATE_PER_TON
}

fn default_binder() -> f64 {
    DEFAULT_BINDER_PER_TON
}

fn default_fuel_surcharge() -> f64 {
    DEFAULT_FUEL_SURCHARGE_PER_TON
}

fn default_delivery() -> f64 {
    DEFAULT_DELIVERY_PER_TRIP
}

fn default_labor() -> f64 {
    DEFAULT_PAVING_LABOR_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driveway() -> ZoneSpec {
        ZoneSpec::new(1000.0, 24.0, 3.0, MixType::Standard)
    }

    #[test]
    fn computes_reference_zone_tonnage() {
        let result = estimate_material(&[driveway()], &MaterialPricing::default()).unwrap();
        assert_eq!(result.total_area_sq_ft, 24_000.0);
        assert_eq!(result.total_volume_cubic_ft, 6_000.0);
        assert_eq!(result.total_tons, 435.0);
        assert_eq!(result.asphalt_tons, 408.9);
        assert_eq!(result.aggregate_tons, 21.75);
        assert_eq!(result.binder_tons, 4.35);
        assert_eq!(result.delivery_trips, 17);
        assert_eq!(result.labor_hours, 204.45);
    }

    #[test]
    fn totals_are_sum_of_line_items() {
        let result = estimate_material(&[driveway()], &MaterialPricing::default()).unwrap();
        let items = result.line_items();
        let summed: f64 = items.iter().map(|item| item.cost).sum();
        assert!((summed - result.total_cost).abs() < 0.05);
        assert_eq!(result.delivery_cost, 17.0 * 150.0);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let zones = vec![
            driveway(),
            ZoneSpec::new(120.0, 60.0, 2.0, MixType::Recycled),
            ZoneSpec::new(40.0, 40.0, 4.0, MixType::Premium),
        ];
        let pricing = MaterialPricing::default();
        let first = estimate_material(&zones, &pricing).unwrap();
        let second = estimate_material(&zones, &pricing).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_cost.to_bits(), second.total_cost.to_bits());
    }

    #[test]
    fn zone_order_does_not_change_totals() {
        let a = driveway();
        let b = ZoneSpec::new(120.0, 60.0, 2.0, MixType::Recycled);
        let pricing = MaterialPricing::default();
        let forward = estimate_material(&[a.clone(), b.clone()], &pricing).unwrap();
        let reverse = estimate_material(&[b, a], &pricing).unwrap();
        assert_eq!(forward.total_tons, reverse.total_tons);
        assert_eq!(forward.total_cost, reverse.total_cost);
        assert_eq!(forward.zones[0].mix_type, MixType::Standard);
        assert_eq!(reverse.zones[0].mix_type, MixType::Recycled);
    }

    #[test]
    fn recycled_share_is_reported_but_not_split() {
        let zone = ZoneSpec::new(100.0, 100.0, 12.0, MixType::Recycled);
        let result = estimate_material(&[zone], &MaterialPricing::default()).unwrap();
        let z = &result.zones[0];
        // 10_000 ft3 * 0.0725 = 725 t
        assert_eq!(z.tons, 725.0);
        assert_eq!(z.asphalt_tons, 652.5);
        let recycled = z.recycled_tons.expect("recycled mix reports reclaimed tons");
        assert!((recycled - 163.125).abs() < 0.01);
        assert_eq!(z.asphalt_tons + z.aggregate_tons + z.binder_tons, 725.0);
    }

    #[test]
    fn zero_sized_zone_is_valid() {
        let zone = ZoneSpec::new(0.0, 24.0, 3.0, MixType::Premium);
        let result = estimate_material(&[zone], &MaterialPricing::default()).unwrap();
        assert_eq!(result.total_tons, 0.0);
        assert_eq!(result.delivery_trips, 0);
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn rejects_empty_and_negative_input() {
        let pricing = MaterialPricing::default();
        assert!(matches!(
            estimate_material(&[], &pricing),
            Err(EstimateError::Validation(_))
        ));
        let zone = ZoneSpec::new(10.0, -1.0, 3.0, MixType::Standard);
        assert!(estimate_material(&[zone], &pricing).is_err());

        let mut pricing = MaterialPricing::default();
        pricing.binder_per_ton = -5.0;
        assert!(estimate_material(&[driveway()], &pricing).is_err());
    }

    #[test]
    fn parses_zone_triples_with_optional_surface() {
        let zone: ZoneSpec = "1000, 24, 3, standard".parse().unwrap();
        assert_eq!(zone, driveway());

        let zone: ZoneSpec = "50,20,2,rap,overlay".parse().unwrap();
        assert_eq!(zone.mix_type, MixType::Recycled);
        assert_eq!(zone.surface_type, SurfaceType::Overlay);
    }

    #[test]
    fn zone_text_errors_split_by_kind() {
        assert!(matches!(
            "1000,24".parse::<ZoneSpec>(),
            Err(EstimateError::Validation(_))
        ));
        assert!(matches!(
            "1000,24,three,standard".parse::<ZoneSpec>(),
            Err(EstimateError::Validation(_))
        ));
        assert!(matches!(
            "1000,24,3,gravel".parse::<ZoneSpec>(),
            Err(EstimateError::Configuration(_))
        ));
        assert!(matches!(
            "1000,24,3,standard,gravel".parse::<ZoneSpec>(),
            Err(EstimateError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_mix_in_json_is_rejected() {
        let raw = r#"{"length": 10, "width": 10, "thickness": 2, "mix_type": "gravel"}"#;
        assert!(serde_json::from_str::<ZoneSpec>(raw).is_err());
    }

    #[test]
    fn raising_any_price_never_lowers_total() {
        let zones = vec![driveway(), ZoneSpec::new(50.0, 50.0, 2.0, MixType::Premium)];
        let base = estimate_material(&zones, &MaterialPricing::default()).unwrap();
        let bumps: [fn(&mut MaterialPricing); 8] = [
            |p| p.mix_per_ton.standard += 1.0,
            |p| p.mix_per_ton.premium += 1.0,
            |p| p.mix_per_ton.recycled += 1.0,
            |p| p.aggregate_per_ton += 1.0,
            |p| p.binder_per_ton += 1.0,
            |p| p.fuel_surcharge_per_ton += 1.0,
            |p| p.delivery_per_trip += 1.0,
            |p| p.labor_per_hour += 1.0,
        ];
        for bump in bumps {
            let mut pricing = MaterialPricing::default();
            bump(&mut pricing);
            let bumped = estimate_material(&zones, &pricing).unwrap();
            assert!(bumped.total_cost >= base.total_cost);
        }
    }
}
