//! Presentation-side derivation of the KPI result set: rows bucketed by
//! category, with render-time sorts. Recomputed from the result set on
//! every use; nothing here is cached or incrementally maintained.

use crate::flows::kpi::KpiRow;

/// Bucket for rows whose category is missing or null.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Group rows by category, preserving the original relative row order
/// inside each bucket and listing buckets in first-seen order.
pub fn group_by_category(rows: &[KpiRow]) -> Vec<(String, Vec<KpiRow>)> {
    let mut groups: Vec<(String, Vec<KpiRow>)> = Vec::new();
    for row in rows {
        let category = row.category.as_deref().unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, bucket)) => bucket.push(row.clone()),
            None => groups.push((category.to_string(), vec![row.clone()])),
        }
    }
    groups
}

/// Category names in lexicographic render order.
pub fn sorted_category_names(groups: &[(String, Vec<KpiRow>)]) -> Vec<String> {
    let mut names: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    names.sort();
    names
}

/// A bucket's rows in lexicographic render order by KPI name.
pub fn rows_sorted_by_name(rows: &[KpiRow]) -> Vec<&KpiRow> {
    let mut sorted: Vec<&KpiRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.kpi_name.cmp(&b.kpi_name));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(category: Option<&str>, name: &str) -> KpiRow {
        KpiRow {
            kpi_id: 0,
            kpi_name: name.to_string(),
            kpi_value: None,
            unit: None,
            category: category.map(str::to_string),
            state_name: "Bihar".to_string(),
            district_name: "Patna".to_string(),
        }
    }

    #[test]
    fn groups_keep_original_order_and_null_goes_to_uncategorized() {
        let rows = vec![
            row(Some("A"), "z"),
            row(None, "a"),
            row(Some("A"), "b"),
        ];
        let groups = group_by_category(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "A");
        let names: Vec<&str> = groups[0].1.iter().map(|r| r.kpi_name.as_str()).collect();
        assert_eq!(names, vec!["z", "b"]);
        assert_eq!(groups[1].0, UNCATEGORIZED);
        assert_eq!(groups[1].1[0].kpi_name, "a");
    }

    #[test]
    fn render_sorts_are_lexicographic() {
        let rows = vec![
            row(Some("A"), "z"),
            row(None, "a"),
            row(Some("A"), "b"),
        ];
        let groups = group_by_category(&rows);
        assert_eq!(sorted_category_names(&groups), vec!["A", UNCATEGORIZED]);
        let sorted: Vec<&str> = rows_sorted_by_name(&groups[0].1)
            .iter()
            .map(|r| r.kpi_name.as_str())
            .collect();
        assert_eq!(sorted, vec!["b", "z"]);
    }

    #[test]
    fn empty_result_set_produces_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }
}
