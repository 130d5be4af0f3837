use serde::{Deserialize, Serialize};

use crate::estimate::schema::PaintType;
use crate::estimate::{require_non_negative, require_positive, round2, EstimateError, LineItem};
use crate::tables::{
    paint_spec, PaintSpec, AISLE_ALLOWANCE_FT, ARROW_AREA_SQ_FT, BLUE_PAINT_SHARE,
    CROSSWALK_ALLOWANCE_FT, DEFAULT_EQUIPMENT_RATE_PER_SQ_FT, DEFAULT_STRIPING_LABOR_RATE,
    FIRE_ZONE_PERIMETER_SHARE, HANDICAP_SYMBOL_AREA_SQ_FT, INCHES_PER_FOOT, SPACES_PER_ADA_SPACE,
    STRIPING_SQ_FT_PER_LABOR_HOUR, WHITE_PAINT_SHARE, YELLOW_PAINT_SHARE,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StripingInput {
    pub lot_length: f64,
    pub lot_width: f64,
    #[serde(default = "default_space_width")]
    pub space_width: f64,
    #[serde(default = "default_space_length")]
    pub space_length: f64,
    #[serde(default = "default_drive_width")]
    pub drive_width: f64,
    #[serde(default = "default_line_width")]
    pub line_width_inches: f64,
    #[serde(default = "default_paint_type")]
    pub paint_type: PaintType,
    #[serde(default)]
    pub ada_required: bool,
    #[serde(default)]
    pub handicap_symbols: bool,
    #[serde(default)]
    pub fire_zone: bool,
    #[serde(default)]
    pub crosswalks: bool,
    #[serde(default)]
    pub arrows: bool,
}

impl StripingInput {
    pub fn new(lot_length: f64, lot_width: f64) -> Self {
        Self {
            lot_length,
            lot_width,
            space_width: default_space_width(),
            space_length: default_space_length(),
            drive_width: default_drive_width(),
            line_width_inches: default_line_width(),
            paint_type: default_paint_type(),
            ada_required: false,
            handicap_symbols: false,
            fire_zone: false,
            crosswalks: false,
            arrows: false,
        }
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        require_positive("lot_length", self.lot_length)?;
        require_positive("lot_width", self.lot_width)?;
        require_positive("space_width", self.space_width)?;
        require_positive("space_length", self.space_length)?;
        require_positive("drive_width", self.drive_width)?;
        require_positive("line_width_inches", self.line_width_inches)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaintTable {
    #[serde(default = "default_waterborne")]
    pub waterborne: PaintPrices,
    #[serde(default = "default_solvent_based")]
    pub solvent_based: PaintPrices,
    #[serde(default = "default_epoxy")]
    pub epoxy: PaintPrices,
    #[serde(default = "default_labor_rate")]
    pub labor_rate_per_hour: f64,
    #[serde(default = "default_equipment_rate")]
    pub equipment_rate_per_sq_ft: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PaintPrices {
    pub coverage_sq_ft_per_gallon: f64,
    pub white_per_gallon: f64,
    pub yellow_per_gallon: f64,
    pub blue_per_gallon: f64,
}

impl From<PaintSpec> for PaintPrices {
    fn from(value: PaintSpec) -> Self {
        Self {
            coverage_sq_ft_per_gallon: value.coverage_sq_ft_per_gallon,
            white_per_gallon: value.white_per_gallon,
            yellow_per_gallon: value.yellow_per_gallon,
            blue_per_gallon: value.blue_per_gallon,
        }
    }
}

impl PaintTable {
    pub fn prices_for(&self, paint: PaintType) -> &PaintPrices {
        match paint {
            PaintType::Waterborne => &self.waterborne,
            PaintType::SolventBased => &self.solvent_based,
            PaintType::Epoxy => &self.epoxy,
        }
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        for paint in PaintType::ALL {
            let prices = self.prices_for(paint);
            let slug = paint.as_slug();
            require_positive(&format!("{slug} coverage"), prices.coverage_sq_ft_per_gallon)?;
            require_non_negative(&format!("{slug} white price"), prices.white_per_gallon)?;
            require_non_negative(&format!("{slug} yellow price"), prices.yellow_per_gallon)?;
            require_non_negative(&format!("{slug} blue price"), prices.blue_per_gallon)?;
        }
        require_non_negative("labor_rate_per_hour", self.labor_rate_per_hour)?;
        require_non_negative("equipment_rate_per_sq_ft", self.equipment_rate_per_sq_ft)?;
        Ok(())
    }
}

impl Default for PaintTable {
    fn default() -> Self {
        Self {
            waterborne: default_waterborne(),
            solvent_based: default_solvent_based(),
            epoxy: default_epoxy(),
            labor_rate_per_hour: default_labor_rate(),
            equipment_rate_per_sq_ft: default_equipment_rate(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaintGallons {
    pub white: f64,
    pub yellow: f64,
    pub blue: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripingResult {
    pub paint_type: PaintType,
    pub spaces_per_row: u64,
    pub rows: u64,
    pub total_spaces: u64,
    pub ada_spaces: u64,
    pub linear_feet: f64,
    pub striping_area_sq_ft: f64,
    pub symbol_area_sq_ft: f64,
    pub total_area_sq_ft: f64,
    pub gallons: PaintGallons,
    pub labor_hours: f64,
    pub paint_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub total_cost: f64,
}

impl StripingResult {
    fn zero_capacity(paint_type: PaintType) -> Self {
        Self {
            paint_type,
            spaces_per_row: 0,
            rows: 0,
            total_spaces: 0,
            ada_spaces: 0,
            linear_feet: 0.0,
            striping_area_sq_ft: 0.0,
            symbol_area_sq_ft: 0.0,
            total_area_sq_ft: 0.0,
            gallons: PaintGallons::default(),
            labor_hours: 0.0,
            paint_cost: 0.0,
            labor_cost: 0.0,
            equipment_cost: 0.0,
            total_cost: 0.0,
        }
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        vec![
            LineItem::new(
                format!("{} paint", self.paint_type),
                self.gallons.total,
                "gal",
                self.paint_cost,
            ),
            LineItem::new("Labor", self.labor_hours, "hr", self.labor_cost),
            LineItem::new(
                "Equipment",
                self.total_area_sq_ft,
                "sq ft",
                self.equipment_cost,
            ),
        ]
    }
}

pub fn estimate_striping(
    input: &StripingInput,
    paint: &PaintTable,
) -> Result<StripingResult, EstimateError> {
    input.validate()?;
    paint.validate()?;

    let usable_width = input.lot_width - input.drive_width;
    let spaces_per_row = (usable_width / input.space_width).floor().max(0.0);
    let rows = (input.lot_length / (input.space_length + AISLE_ALLOWANCE_FT))
        .floor()
        .max(0.0);
    let total_spaces = spaces_per_row * rows;
    if total_spaces <= 0.0 {
        return Ok(StripingResult::zero_capacity(input.paint_type));
    }

    let ada_spaces = if input.ada_required {
        (total_spaces / SPACES_PER_ADA_SPACE).ceil().max(1.0)
    } else {
        0.0
    };

    let mut linear_feet = (spaces_per_row + 1.0) * rows * input.space_length
        + spaces_per_row * rows * 2.0 * input.space_width
        + input.lot_length * 2.0;
    if input.fire_zone {
        let perimeter = 2.0 * (input.lot_length + input.lot_width);
        linear_feet += perimeter * FIRE_ZONE_PERIMETER_SHARE;
    }
    if input.crosswalks {
        linear_feet += CROSSWALK_ALLOWANCE_FT;
    }

    let mut symbol_area = 0.0;
    if input.arrows {
        symbol_area += (rows / 2.0).floor() * ARROW_AREA_SQ_FT;
    }
    if input.handicap_symbols {
        symbol_area += ada_spaces * HANDICAP_SYMBOL_AREA_SQ_FT;
    }

    let striping_area = linear_feet * input.line_width_inches / INCHES_PER_FOOT;
    let total_area = striping_area + symbol_area;

    let prices = paint.prices_for(input.paint_type);
    let total_gallons = total_area / prices.coverage_sq_ft_per_gallon;
    let white = total_gallons * WHITE_PAINT_SHARE;
    let yellow = total_gallons * YELLOW_PAINT_SHARE;
    let blue = total_gallons * BLUE_PAINT_SHARE;
    let paint_cost = white * prices.white_per_gallon
        + yellow * prices.yellow_per_gallon
        + blue * prices.blue_per_gallon;

    let labor_hours = total_area / STRIPING_SQ_FT_PER_LABOR_HOUR;
    let labor_cost = labor_hours * paint.labor_rate_per_hour;
    let equipment_cost = total_area * paint.equipment_rate_per_sq_ft;

    Ok(StripingResult {
        paint_type: input.paint_type,
        spaces_per_row: spaces_per_row as u64,
        rows: rows as u64,
        total_spaces: total_spaces as u64,
        ada_spaces: ada_spaces as u64,
        linear_feet: round2(linear_feet),
        striping_area_sq_ft: round2(striping_area),
        symbol_area_sq_ft: round2(symbol_area),
        total_area_sq_ft: round2(total_area),
        gallons: PaintGallons {
            white: round2(white),
            yellow: round2(yellow),
            blue: round2(blue),
            total: round2(total_gallons),
        },
        labor_hours: round2(labor_hours),
        paint_cost: round2(paint_cost),
        labor_cost: round2(labor_cost),
        equipment_cost: round2(equipment_cost),
        total_cost: round2(paint_cost + labor_cost + equipment_cost),
    })
}

fn default_space_width() -> f64 {
    9.0
}

fn default_space_length() -> f64 {
    18.0
}

fn default_drive_width() -> f64 {
    24.0
}

fn default_line_width() -> f64 {
    4.0
}

fn default_paint_type() -> PaintType {
    PaintType::Waterborne
}

fn default_waterborne() -> PaintPrices {
    paint_spec(PaintType::Waterborne).into()
}

fn default_solvent_based() -> PaintPrices {
    paint_spec(PaintType::SolventBased).into()
}

fn default_epoxy() -> PaintPrices {
    paint_spec(PaintType::Epoxy).into()
}

fn default_labor_rate() -> f64 {
    DEFAULT_STRIPING_LABOR_RATE
}

fn default_equipment_rate() -> f64 {
    DEFAULT_EQUIPMENT_RATE_PER_SQ_FT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_lot() -> StripingInput {
        let mut input = StripingInput::new(300.0, 150.0);
        input.ada_required = true;
        input
    }

    #[test]
    fn computes_reference_lot_layout() {
        let result = estimate_striping(&reference_lot(), &PaintTable::default()).unwrap();
        assert_eq!(result.spaces_per_row, 14);
        assert_eq!(result.rows, 13);
        assert_eq!(result.total_spaces, 182);
        assert_eq!(result.ada_spaces, 8);
    }

    #[test]
    fn accumulates_linear_feet_and_paint_split() {
        let result = estimate_striping(&reference_lot(), &PaintTable::default()).unwrap();
        // dividers 15*13*18 = 3510, caps 14*13*2*9 = 3276, drive lane 600
        assert_eq!(result.linear_feet, 7386.0);
        assert_eq!(result.striping_area_sq_ft, 2462.0);
        assert_eq!(result.symbol_area_sq_ft, 0.0);
        assert_eq!(result.gallons.total, round2(2462.0 / 320.0));
        assert_eq!(result.gallons.white, round2(2462.0 / 320.0 * 0.85));
        assert_eq!(result.labor_hours, round2(2462.0 / 500.0));
        assert_eq!(result.equipment_cost, round2(2462.0 * 0.05));
    }

    #[test]
    fn optional_features_add_footage_and_symbols() {
        let mut input = reference_lot();
        input.fire_zone = true;
        input.crosswalks = true;
        input.arrows = true;
        input.handicap_symbols = true;
        let result = estimate_striping(&input, &PaintTable::default()).unwrap();
        // + perimeter 900 * 0.10 + crosswalk 100
        assert_eq!(result.linear_feet, 7386.0 + 90.0 + 100.0);
        // arrows floor(13/2)*15 = 90, symbols 8*12 = 96
        assert_eq!(result.symbol_area_sq_ft, 186.0);
    }

    #[test]
    fn ada_minimum_is_one_space() {
        let mut input = StripingInput::new(22.0, 33.0);
        input.ada_required = true;
        let result = estimate_striping(&input, &PaintTable::default()).unwrap();
        assert_eq!(result.total_spaces, 1);
        assert_eq!(result.ada_spaces, 1);
    }

    #[test]
    fn lot_too_narrow_yields_zero_capacity_result() {
        let mut input = StripingInput::new(300.0, 20.0);
        input.ada_required = true;
        input.crosswalks = true;
        let result = estimate_striping(&input, &PaintTable::default()).unwrap();
        assert_eq!(result.total_spaces, 0);
        assert_eq!(result.ada_spaces, 0);
        assert_eq!(result.linear_feet, 0.0);
        assert_eq!(result.gallons.total, 0.0);
        assert_eq!(result.total_cost, 0.0);

        let short = StripingInput::new(10.0, 150.0);
        let result = estimate_striping(&short, &PaintTable::default()).unwrap();
        assert_eq!(result.rows, 0);
        assert_eq!(result.labor_hours, 0.0);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let mut input = StripingInput::new(300.0, 150.0);
        input.space_width = 0.0;
        assert!(matches!(
            estimate_striping(&input, &PaintTable::default()),
            Err(EstimateError::Validation(_))
        ));
        let input = StripingInput::new(-1.0, 150.0);
        assert!(estimate_striping(&input, &PaintTable::default()).is_err());
    }

    #[test]
    fn epoxy_costs_more_than_waterborne() {
        let waterborne = estimate_striping(&reference_lot(), &PaintTable::default()).unwrap();
        let mut input = reference_lot();
        input.paint_type = PaintType::Epoxy;
        let epoxy = estimate_striping(&input, &PaintTable::default()).unwrap();
        assert!(epoxy.gallons.total > waterborne.gallons.total);
        assert!(epoxy.paint_cost > waterborne.paint_cost);
        assert_eq!(epoxy.labor_cost, waterborne.labor_cost);
    }

    #[test]
    fn raising_any_price_never_lowers_total() {
        let input = reference_lot();
        let base = estimate_striping(&input, &PaintTable::default()).unwrap();
        let bumps: [fn(&mut PaintTable); 5] = [
            |t| t.waterborne.white_per_gallon += 1.0,
            |t| t.waterborne.yellow_per_gallon += 1.0,
            |t| t.waterborne.blue_per_gallon += 1.0,
            |t| t.labor_rate_per_hour += 1.0,
            |t| t.equipment_rate_per_sq_ft += 0.01,
        ];
        for bump in bumps {
            let mut table = PaintTable::default();
            bump(&mut table);
            let bumped = estimate_striping(&input, &table).unwrap();
            assert!(bumped.total_cost >= base.total_cost);
        }
    }
}
