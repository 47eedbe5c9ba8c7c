//! `slidewall effects`: the catalog as a table or as JSON.

use anyhow::{Context, Result};
use effects::{random_range, EffectCatalog, ParamSpec, Schema};
use serde_json::{json, Value};

use crate::cli::EffectsArgs;

pub fn run(args: EffectsArgs) -> Result<()> {
    let catalog = EffectCatalog::new();
    if args.json {
        let document = catalog_json(&catalog);
        let rendered =
            serde_json::to_string_pretty(&document).context("failed to encode catalog as JSON")?;
        println!("{rendered}");
    } else {
        print!("{}", catalog_table(&catalog));
    }
    Ok(())
}

fn spec_json(spec: &ParamSpec) -> Value {
    let mut entry = json!({
        "name": spec.key.name(),
        "uniform": spec.key.uniform_name(),
        "min": spec.min,
        "max": spec.max,
        "step": spec.step,
        "default": spec.default,
    });
    if let Some(range) = random_range(spec.key) {
        entry["random"] = json!([range.min, range.max]);
    }
    entry
}

fn schema_json(schema: &Schema) -> Value {
    Value::Array(schema.params.iter().map(spec_json).collect())
}

pub fn catalog_json(catalog: &EffectCatalog) -> Value {
    let families: Vec<Value> = catalog
        .list_effects()
        .iter()
        .map(|family| {
            let presets: Vec<Value> = catalog
                .presets(*family)
                .iter()
                .map(|preset| {
                    let values: serde_json::Map<String, Value> = preset
                        .values
                        .iter()
                        .map(|(key, value)| (key.name().to_string(), json!(value)))
                        .collect();
                    json!({ "name": preset.name, "values": values })
                })
                .collect();
            json!({
                "name": family.name(),
                "selector": family.selector(),
                "params": schema_json(&catalog.schema(*family)),
                "presets": presets,
            })
        })
        .collect();
    json!({
        "globals": schema_json(&catalog.global_schema()),
        "timing": schema_json(&catalog.timing_schema()),
        "effects": families,
    })
}

fn write_rows(out: &mut String, schema: &Schema) {
    for spec in &schema.params {
        out.push_str(&format!(
            "  {:<26} {:>8} {:>8} {:>6} {:>8}\n",
            spec.key.name(),
            trim(spec.min),
            trim(spec.max),
            trim(spec.step),
            trim(spec.default)
        ));
    }
}

fn trim(value: f32) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn catalog_table(catalog: &EffectCatalog) -> String {
    let mut out = String::new();
    let header = format!(
        "  {:<26} {:>8} {:>8} {:>6} {:>8}\n",
        "parameter", "min", "max", "step", "default"
    );

    out.push_str("globals\n");
    out.push_str(&header);
    write_rows(&mut out, &catalog.global_schema());
    out.push_str("\ntiming\n");
    out.push_str(&header);
    write_rows(&mut out, &catalog.timing_schema());

    for family in catalog.list_effects() {
        out.push_str(&format!("\n{} (selector {})\n", family, family.selector()));
        out.push_str(&header);
        write_rows(&mut out, &catalog.schema(*family));
        let presets: Vec<&str> = catalog.presets(*family).names().collect();
        out.push_str(&format!("  presets: {}\n", presets.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_family_and_preset() {
        let table = catalog_table(&EffectCatalog::new());
        for family in ["glass", "frost", "ripple", "plasma", "timeshift"] {
            assert!(table.contains(family), "missing {family}");
        }
        assert!(table.contains("rippleFrequency"));
        assert!(table.contains("Arctic"));
        assert!(table.contains("autoSlideSpeed"));
        assert!(table.contains("Custom"));
    }

    #[test]
    fn json_carries_bounds_and_presets() {
        let document = catalog_json(&EffectCatalog::new());
        let effects = document["effects"].as_array().unwrap();
        assert_eq!(effects.len(), 5);

        let frost = &effects[1];
        assert_eq!(frost["name"], "frost");
        assert_eq!(frost["selector"], 1);
        let arctic = frost["presets"]
            .as_array()
            .unwrap()
            .iter()
            .find(|preset| preset["name"] == "Arctic")
            .unwrap();
        assert!(arctic["values"]["frostIntensity"].as_f64().unwrap() > 2.7);

        let timing = document["timing"].as_array().unwrap();
        assert!(timing.iter().all(|spec| spec.get("random").is_none()));
    }

    #[test]
    fn trims_trailing_zeroes() {
        assert_eq!(trim(2000.0), "2000");
        assert_eq!(trim(0.05), "0.05");
        assert_eq!(trim(1.5), "1.5");
    }
}
