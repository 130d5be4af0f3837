use serde::{Deserialize, Serialize};

use crate::estimate::schema::SealerType;
use crate::estimate::{require_non_negative, require_positive, round2, EstimateError, LineItem};
use crate::tables::{
    sealer_spec, DEFAULT_ADDITIVE_COST_PER_GALLON, DEFAULT_ADDITIVE_PERCENT,
    DEFAULT_APPLICATION_RATE, DEFAULT_SAND_COST_PER_POUND, DEFAULT_SAND_POUNDS_PER_100_GAL,
    DEFAULT_WATER_RATIO_PERCENT, MAX_COATS, SEALER_CONCENTRATION_RATIO, SQ_FT_PER_SQ_YD,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SealcoatInput {
    pub square_feet: f64,
    #[serde(default = "default_coats")]
    pub coats: u32,
    /// Gallons of mixed sealer per square yard per coat.
    #[serde(default = "default_application_rate")]
    pub application_rate: f64,
    pub sealer_type: SealerType,
    #[serde(default = "default_water_ratio_percent")]
    pub water_ratio_percent: f64,
    #[serde(default = "default_additive_percent")]
    pub additive_percent: f64,
    #[serde(default = "default_sand_pounds")]
    pub sand_pounds_per_100_gal: f64,
}

impl SealcoatInput {
    pub fn new(square_feet: f64, sealer_type: SealerType) -> Self {
        Self {
            square_feet,
            coats: default_coats(),
            application_rate: default_application_rate(),
            sealer_type,
            water_ratio_percent: default_water_ratio_percent(),
            additive_percent: default_additive_percent(),
            sand_pounds_per_100_gal: default_sand_pounds(),
        }
    }

    pub fn with_coats(mut self, coats: u32) -> Self {
        self.coats = coats;
        self
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        require_positive("square_feet", self.square_feet)?;
        if !(1..=MAX_COATS).contains(&self.coats) {
            return Err(EstimateError::Validation(format!(
                "coats must be between 1 and {MAX_COATS}, got {}",
                self.coats
            )));
        }
        require_positive("application_rate", self.application_rate)?;
        require_non_negative("water_ratio_percent", self.water_ratio_percent)?;
        if self.water_ratio_percent >= 100.0 {
            return Err(EstimateError::Validation(format!(
                "water_ratio_percent must be below 100, got {}",
                self.water_ratio_percent
            )));
        }
        require_non_negative("additive_percent", self.additive_percent)?;
        require_non_negative("sand_pounds_per_100_gal", self.sand_pounds_per_100_gal)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealerCosts {
    pub coal_tar: f64,
    pub asphalt_emulsion: f64,
    pub acrylic: f64,
    pub polymer_modified: f64,
}

impl SealerCosts {
    pub fn cost_for(&self, sealer: SealerType) -> f64 {
        match sealer {
            SealerType::CoalTar => self.coal_tar,
            SealerType::AsphaltEmulsion => self.asphalt_emulsion,
            SealerType::Acrylic => self.acrylic,
            SealerType::PolymerModified => self.polymer_modified,
        }
    }
}

impl Default for SealerCosts {
    fn default() -> Self {
        Self {
            coal_tar: sealer_spec(SealerType::CoalTar).cost_per_gallon,
            asphalt_emulsion: sealer_spec(SealerType::AsphaltEmulsion).cost_per_gallon,
            acrylic: sealer_spec(SealerType::Acrylic).cost_per_gallon,
            polymer_modified: sealer_spec(SealerType::PolymerModified).cost_per_gallon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealcoatPricing {
    #[serde(default)]
    pub sealer_costs: SealerCosts,
    #[serde(default = "default_additive_cost")]
    pub additive_per_gallon: f64,
    #[serde(default = "default_sand_cost")]
    pub sand_per_pound: f64,
}

impl SealcoatPricing {
    pub fn validate(&self) -> Result<(), EstimateError> {
        for sealer in SealerType::ALL {
            require_non_negative(
                &format!("{} cost per gallon", sealer.as_slug()),
                self.sealer_costs.cost_for(sealer),
            )?;
        }
        require_non_negative("additive_per_gallon", self.additive_per_gallon)?;
        require_non_negative("sand_per_pound", self.sand_per_pound)?;
        Ok(())
    }
}

impl Default for SealcoatPricing {
    fn default() -> Self {
        Self {
            sealer_costs: SealerCosts::default(),
            additive_per_gallon: default_additive_cost(),
            sand_per_pound: default_sand_cost(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealcoatResult {
    pub sealer_type: SealerType,
    pub coats: u32,
    pub square_feet: f64,
    pub square_yards: f64,
    pub application_rate: f64,
    pub recommended_rate: f64,
    pub mixed_sealer_gallons: f64,
    pub concentrate_gallons: f64,
    pub water_gallons: f64,
    pub additive_gallons: f64,
    pub sand_pounds: f64,
    pub total_mix_gallons: f64,
    pub sealer_cost: f64,
    pub additive_cost: f64,
    pub sand_cost: f64,
    pub total_cost: f64,
}

impl SealcoatResult {
    pub fn line_items(&self) -> Vec<LineItem> {
        vec![
            LineItem::new(
                format!("{} concentrate", self.sealer_type),
                self.concentrate_gallons,
                "gal",
                self.sealer_cost,
            ),
            LineItem::new("Water", self.water_gallons, "gal", 0.0),
            LineItem::new("Additive", self.additive_gallons, "gal", self.additive_cost),
            LineItem::new("Sand", self.sand_pounds, "lb", self.sand_cost),
        ]
    }
}

pub fn estimate_sealcoat(
    input: &SealcoatInput,
    pricing: &SealcoatPricing,
) -> Result<SealcoatResult, EstimateError> {
    input.validate()?;
    pricing.validate()?;

    let square_yards = input.square_feet / SQ_FT_PER_SQ_YD;
    let mixed_sealer = square_yards * input.application_rate * f64::from(input.coats);
    let concentrate = mixed_sealer * SEALER_CONCENTRATION_RATIO;
    // Water is back-solved so that it makes up `ratio` of concentrate plus water.
    let water_ratio = input.water_ratio_percent / 100.0;
    let water = concentrate * water_ratio / (1.0 - water_ratio);
    let sand = (mixed_sealer / 100.0) * input.sand_pounds_per_100_gal;
    let additive = concentrate * input.additive_percent / 100.0;

    let sealer_cost = concentrate * pricing.sealer_costs.cost_for(input.sealer_type);
    let additive_cost = additive * pricing.additive_per_gallon;
    let sand_cost = sand * pricing.sand_per_pound;
    let total_cost = sealer_cost + additive_cost + sand_cost;

    Ok(SealcoatResult {
        sealer_type: input.sealer_type,
        coats: input.coats,
        square_feet: round2(input.square_feet),
        square_yards: round2(square_yards),
        application_rate: input.application_rate,
        recommended_rate: sealer_spec(input.sealer_type).base_rate,
        mixed_sealer_gallons: round2(mixed_sealer),
        concentrate_gallons: round2(concentrate),
        water_gallons: round2(water),
        additive_gallons: round2(additive),
        sand_pounds: round2(sand),
        total_mix_gallons: round2(concentrate + water + additive),
        sealer_cost: round2(sealer_cost),
        additive_cost: round2(additive_cost),
        sand_cost: round2(sand_cost),
        total_cost: round2(total_cost),
    })
}

fn default_coats() -> u32 {
    1
}

fn default_application_rate() -> f64 {
    DEFAULT_APPLICATION_RATE
}

fn default_water_ratio_percent() -> f64 {
    DEFAULT_WATER_RATIO_PERCENT
}

fn default_additive_percent() -> f64 {
    DEFAULT_ADDITIVE_PERCENT
}

fn default_sand_pounds() -> f64 {
    DEFAULT_SAND_POUNDS_PER_100_GAL
}

fn default_additive_cost() -> f64 {
    DEFAULT_ADDITIVE_COST_PER_GALLON
}

fn default_sand_cost() -> f64 {
    DEFAULT_SAND_COST_PER_POUND
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> SealcoatInput {
        SealcoatInput::new(10_000.0, SealerType::CoalTar)
    }

    #[test]
    fn matches_reference_coal_tar_estimate() {
        let result = estimate_sealcoat(&reference_input(), &SealcoatPricing::default())
            .expect("estimate failed");
        assert_eq!(result.square_yards, 1111.11);
        assert_eq!(result.mixed_sealer_gallons, 166.67);
        assert_eq!(result.concentrate_gallons, 108.33);
        assert_eq!(result.water_gallons, 36.11);
        assert_eq!(result.sand_pounds, 83.33);
        assert_eq!(result.additive_gallons, 10.83);
        // 108.333 * 1.85 + 10.833 * 4.50 + 83.333 * 0.15
        assert_eq!(result.sealer_cost, 200.42);
        assert_eq!(result.additive_cost, 48.75);
        assert_eq!(result.sand_cost, 12.5);
        assert_eq!(result.total_cost, 261.67);
    }

    #[test]
    fn water_uses_back_solved_ratio_not_remainder() {
        let result = estimate_sealcoat(&reference_input(), &SealcoatPricing::default())
            .expect("estimate failed");
        let remainder = result.mixed_sealer_gallons - result.concentrate_gallons;
        assert!((result.water_gallons - remainder).abs() > 1.0);
        assert_eq!(result.water_gallons, round2(108.333_333 / 3.0));
    }

    #[test]
    fn coats_scale_volume_linearly() {
        let one = estimate_sealcoat(&reference_input(), &SealcoatPricing::default()).unwrap();
        let three = estimate_sealcoat(
            &reference_input().with_coats(3),
            &SealcoatPricing::default(),
        )
        .unwrap();
        assert_eq!(three.mixed_sealer_gallons, 500.0);
        assert!(three.total_cost > one.total_cost * 2.9);
    }

    #[test]
    fn rejects_non_positive_area_and_bad_coats() {
        let pricing = SealcoatPricing::default();
        let mut input = reference_input();
        input.square_feet = 0.0;
        assert!(matches!(
            estimate_sealcoat(&input, &pricing),
            Err(EstimateError::Validation(_))
        ));

        let input = reference_input().with_coats(4);
        assert!(matches!(
            estimate_sealcoat(&input, &pricing),
            Err(EstimateError::Validation(_))
        ));

        let mut input = reference_input();
        input.water_ratio_percent = 100.0;
        assert!(estimate_sealcoat(&input, &pricing).is_err());
    }

    #[test]
    fn uses_configured_sealer_price() {
        let mut pricing = SealcoatPricing::default();
        pricing.sealer_costs.acrylic = 4.0;
        let input = SealcoatInput::new(9_000.0, SealerType::Acrylic);
        let result = estimate_sealcoat(&input, &pricing).unwrap();
        // 1000 sq yd * 0.15 * 0.65 = 97.5 gal of concentrate
        assert_eq!(result.concentrate_gallons, 97.5);
        assert_eq!(result.sealer_cost, 390.0);
        assert_eq!(result.recommended_rate, 0.12);
    }

    #[test]
    fn raising_any_price_never_lowers_total() {
        let input = reference_input();
        let base = estimate_sealcoat(&input, &SealcoatPricing::default()).unwrap();
        let bumps: [fn(&mut SealcoatPricing); 3] = [
            |p| p.sealer_costs.coal_tar += 1.0,
            |p| p.additive_per_gallon += 1.0,
            |p| p.sand_per_pound += 1.0,
        ];
        for bump in bumps {
            let mut pricing = SealcoatPricing::default();
            bump(&mut pricing);
            let bumped = estimate_sealcoat(&input, &pricing).unwrap();
            assert!(bumped.total_cost >= base.total_cost);
        }
    }

    #[test]
    fn rejects_unknown_fields_in_json_input() {
        let raw = r#"{"square_feet": 100.0, "sealer_type": "acrylic", "colour": "black"}"#;
        assert!(serde_json::from_str::<SealcoatInput>(raw).is_err());
        let raw = r#"{"square_feet": 100.0, "sealer_type": "acrylic"}"#;
        let parsed: SealcoatInput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.coats, 1);
        assert_eq!(parsed.water_ratio_percent, 25.0);
    }
}
