use serde::Serialize;

use crate::estimate::schema::{MixType, PaintType, SealerType};

pub const SQ_FT_PER_SQ_YD: f64 = 9.0;
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Hot-mix asphalt density: ~145 lb/ft3 over 2000 lb/ton.
pub const ASPHALT_TONS_PER_CUBIC_FOOT: f64 = 0.0725;
pub const TONS_PER_TRUCKLOAD: f64 = 25.0;
pub const ASPHALT_TONS_PER_LABOR_HOUR: f64 = 2.0;

pub const DEFAULT_APPLICATION_RATE: f64 = 0.15;
/// Share of the mixed sealer that is concentrate.
pub const SEALER_CONCENTRATION_RATIO: f64 = 0.65;
pub const DEFAULT_WATER_RATIO_PERCENT: f64 = 25.0;
pub const DEFAULT_ADDITIVE_PERCENT: f64 = 10.0;
pub const DEFAULT_SAND_POUNDS_PER_100_GAL: f64 = 50.0;
pub const DEFAULT_ADDITIVE_COST_PER_GALLON: f64 = 4.50;
pub const DEFAULT_SAND_COST_PER_POUND: f64 = 0.15;
pub const MAX_COATS: u32 = 3;

/// Driving aisle reserved behind every row of spaces, in feet.
pub const AISLE_ALLOWANCE_FT: f64 = 4.0;
pub const SPACES_PER_ADA_SPACE: f64 = 25.0;
pub const FIRE_ZONE_PERIMETER_SHARE: f64 = 0.10;
pub const CROSSWALK_ALLOWANCE_FT: f64 = 100.0;
pub const ARROW_AREA_SQ_FT: f64 = 15.0;
pub const HANDICAP_SYMBOL_AREA_SQ_FT: f64 = 12.0;
pub const STRIPING_SQ_FT_PER_LABOR_HOUR: f64 = 500.0;
pub const DEFAULT_STRIPING_LABOR_RATE: f64 = 65.0;
pub const DEFAULT_EQUIPMENT_RATE_PER_SQ_FT: f64 = 0.05;

pub const WHITE_PAINT_SHARE: f64 = 0.85;
pub const YELLOW_PAINT_SHARE: f64 = 0.10;
pub const BLUE_PAINT_SHARE: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SealerSpec {
    /// Recommended application rate in gallons per square yard.
    pub base_rate: f64,
    pub cost_per_gallon: f64,
}

pub fn sealer_spec(sealer: SealerType) -> SealerSpec {
    match sealer {
        SealerType::CoalTar => SealerSpec {
            base_rate: 0.15,
            cost_per_gallon: 1.85,
        },
        SealerType::AsphaltEmulsion => SealerSpec {
            base_rate: 0.15,
            cost_per_gallon: 1.65,
        },
        SealerType::Acrylic => SealerSpec {
            base_rate: 0.12,
            cost_per_gallon: 3.25,
        },
        SealerType::PolymerModified => SealerSpec {
            base_rate: 0.14,
            cost_per_gallon: 2.45,
        },
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MixComposition {
    pub asphalt_fraction: f64,
    pub aggregate_fraction: f64,
    pub binding_fraction: f64,
    /// Reclaimed share of the asphalt fraction. Reported only.
    pub recycled_fraction: Option<f64>,
}

pub fn mix_composition(mix: MixType) -> MixComposition {
    match mix {
        MixType::Standard => MixComposition {
            asphalt_fraction: 0.94,
            aggregate_fraction: 0.05,
            binding_fraction: 0.01,
            recycled_fraction: None,
        },
        MixType::Premium => MixComposition {
            asphalt_fraction: 0.92,
            aggregate_fraction: 0.06,
            binding_fraction: 0.02,
            recycled_fraction: None,
        },
        MixType::Recycled => MixComposition {
            asphalt_fraction: 0.90,
            aggregate_fraction: 0.08,
            binding_fraction: 0.02,
            recycled_fraction: Some(0.25),
        },
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PaintSpec {
    pub coverage_sq_ft_per_gallon: f64,
    pub white_per_gallon: f64,
    pub yellow_per_gallon: f64,
    pub blue_per_gallon: f64,
}

pub fn paint_spec(paint: PaintType) -> PaintSpec {
    match paint {
        PaintType::Waterborne => PaintSpec {
            coverage_sq_ft_per_gallon: 320.0,
            white_per_gallon: 18.50,
            yellow_per_gallon: 19.75,
            blue_per_gallon: 24.00,
        },
        PaintType::SolventBased => PaintSpec {
            coverage_sq_ft_per_gallon: 280.0,
            white_per_gallon: 22.00,
            yellow_per_gallon: 23.50,
            blue_per_gallon: 28.00,
        },
        PaintType::Epoxy => PaintSpec {
            coverage_sq_ft_per_gallon: 200.0,
            white_per_gallon: 45.00,
            yellow_per_gallon: 47.50,
            blue_per_gallon: 55.00,
        },
    }
}

pub fn default_mix_price_per_ton(mix: MixType) -> f64 {
    match mix {
        MixType::Standard => 95.0,
        MixType::Premium => 115.0,
        MixType::Recycled => 80.0,
    }
}

pub const DEFAULT_AGGREGATE_PER_TON: f64 = 28.0;
pub const DEFAULT_BINDER_PER_TON: f64 = 550.0;
pub const DEFAULT_FUEL_SURCHARGE_PER_TON: f64 = 3.50;
pub const DEFAULT_DELIVERY_PER_TRIP: f64 = 150.0;
pub const DEFAULT_PAVING_LABOR_RATE: f64 = 45.0;
