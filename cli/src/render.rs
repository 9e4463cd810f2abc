//! Plain-text rendering of selection options and fetched results. These are
//! pure string builders; coloring happens at the print site.

use healthnav_cascade::OptionItem;
use healthnav_cascade::flows::Facility;
use healthnav_cascade::flows::FacilityType;
use healthnav_cascade::flows::KpiRow;
use healthnav_cascade::flows::ReferralResults;
use healthnav_cascade::grouping;

/// Numbered option list for the tier the user is currently choosing.
pub fn options_list(label: &str, options: &[OptionItem]) -> String {
    let mut out = format!("Select {label}:\n");
    for (index, option) in options.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", index + 1, option.label));
    }
    out
}

pub fn referral_results(results: &ReferralResults) -> String {
    let mut out = String::new();
    let start = &results.start_facility;
    out.push_str("Starting Facility:\n");
    out.push_str(&format!(
        "  {} ({} - {})\n",
        start.name, start.facility_type, start.district
    ));
    out.push_str(&format!(
        "  Lat: {}, Lon: {}\n",
        coord(start.latitude),
        coord(start.longitude)
    ));
    if let Some(next) = FacilityType::parse(&start.facility_type).and_then(FacilityType::next_level)
    {
        out.push_str(&format!("  Refers up to: {next}\n"));
    }

    if let Some(closest) = &results.closest_next_level_facility {
        out.push_str("\nClosest Next-Level Facility in Same District:\n");
        out.push_str(&format!("  {} ({})\n", closest.name, closest.facility_type));
        out.push_str(&format!("  Distance: {}\n", distance(closest.distance_km)));
        out.push_str(&format!(
            "  Lat: {}, Lon: {}\n",
            coord(closest.latitude),
            coord(closest.longitude)
        ));
    }

    if !results.all_next_level_facilities.is_empty() {
        out.push_str("\nAll Next-Level Facilities in Same District (by Distance):\n");
        for (index, facility) in results.all_next_level_facilities.iter().enumerate() {
            out.push_str(&facility_line(index + 1, facility));
        }
    }
    out
}

fn facility_line(rank: usize, facility: &Facility) -> String {
    format!(
        "  {rank}. {} ({}) - {}\n",
        facility.name,
        facility.facility_type,
        distance(facility.distance_km)
    )
}

/// Category sections in lexicographic order; collapsed sections show only
/// the row count, expanded ones a name-sorted table.
pub fn kpi_results(rows: &[KpiRow], is_expanded: impl Fn(&str) -> bool) -> String {
    let groups = grouping::group_by_category(rows);
    let mut out = String::new();
    for name in grouping::sorted_category_names(&groups) {
        let Some((_, bucket)) = groups.iter().find(|(group, _)| *group == name) else {
            continue;
        };
        if is_expanded(&name) {
            out.push_str(&format!("v {name}\n"));
            for row in grouping::rows_sorted_by_name(bucket) {
                out.push_str(&format!(
                    "    {:<48} {:>12}  {}\n",
                    row.kpi_name,
                    value(row.kpi_value),
                    row.unit.as_deref().unwrap_or("N/A")
                ));
            }
        } else {
            out.push_str(&format!("> {name} ({} KPIs)\n", bucket.len()));
        }
    }
    out
}

fn value(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn coord(coord: Option<f64>) -> String {
    coord.map_or_else(|| "N/A".to_string(), |c| format!("{c:.5}"))
}

fn distance(km: Option<f64>) -> String {
    km.map_or_else(|| "N/A".to_string(), |d| format!("{d:.2} km"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kpi_row(category: Option<&str>, name: &str, value: Option<f64>) -> KpiRow {
        KpiRow {
            kpi_id: 0,
            kpi_name: name.to_string(),
            kpi_value: value,
            unit: None,
            category: category.map(str::to_string),
            state_name: "Bihar".to_string(),
            district_name: "Patna".to_string(),
        }
    }

    fn facility(name: &str, kind: &str, distance_km: Option<f64>) -> Facility {
        Facility {
            name: name.to_string(),
            facility_type: kind.to_string(),
            district: "Patna".to_string(),
            latitude: Some(25.59417),
            longitude: Some(85.13762),
            distance_km,
        }
    }

    #[test]
    fn referral_block_shows_ladder_context_and_distances() {
        let results = ReferralResults {
            start_facility: facility("Anandpur SC", "SUB_CEN", None),
            closest_next_level_facility: Some(facility("Phulwari PHC", "PHC", Some(6.417))),
            all_next_level_facilities: vec![facility("Phulwari PHC", "PHC", Some(6.417))],
        };
        let text = referral_results(&results);
        assert!(text.contains("Anandpur SC (SUB_CEN - Patna)"), "{text}");
        assert!(text.contains("Refers up to: PHC"), "{text}");
        assert!(text.contains("Distance: 6.42 km"), "{text}");
        assert!(text.contains("Lat: 25.59417, Lon: 85.13762"), "{text}");
    }

    #[test]
    fn missing_coordinates_and_distances_fall_back_to_na() {
        let mut start = facility("AIIMS Patna", "Medical College", None);
        start.latitude = None;
        start.longitude = None;
        let results = ReferralResults {
            start_facility: start,
            closest_next_level_facility: None,
            all_next_level_facilities: Vec::new(),
        };
        let text = referral_results(&results);
        assert!(text.contains("Lat: N/A, Lon: N/A"), "{text}");
        // Top of the ladder: no next level to point at.
        assert!(!text.contains("Refers up to"), "{text}");
        assert!(!text.contains("Closest Next-Level"), "{text}");
    }

    #[test]
    fn kpi_sections_sort_categories_and_rows() {
        let rows = vec![
            kpi_row(Some("A"), "z", Some(1.5)),
            kpi_row(None, "a", None),
            kpi_row(Some("A"), "b", Some(2.0)),
        ];
        let text = kpi_results(&rows, |name| name == "A");
        let a_pos = text.find("v A").expect("expanded A");
        let unc_pos = text.find("> Uncategorized (1 KPIs)").expect("collapsed bucket");
        assert!(a_pos < unc_pos, "{text}");
        let b_pos = text.find("    b").expect("row b");
        let z_pos = text.find("    z").expect("row z");
        assert!(b_pos < z_pos, "{text}");
    }

    #[test]
    fn collapsed_sections_hide_rows() {
        let rows = vec![kpi_row(Some("A"), "z", Some(1.0))];
        let text = kpi_results(&rows, |_| false);
        assert_eq!(text, "> A (1 KPIs)\n");
    }

    #[test]
    fn options_are_numbered_from_one() {
        let options = vec![OptionItem::plain("Bihar"), OptionItem::plain("Kerala")];
        assert_eq!(
            options_list("State", &options),
            "Select State:\n  1. Bihar\n  2. Kerala\n"
        );
    }
}
