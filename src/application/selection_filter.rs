// Selection filter - Views over the stores restricted to the chosen servers
use crate::domain::measurement::{AverageRecord, Sample};
use crate::domain::selection::Selection;

/// Samples whose canonical server is selected, or all when nothing is selected.
pub fn filter_samples<'a, I>(samples: I, selection: &Selection) -> Vec<&'a Sample>
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .filter(|s| selection.includes_server(&s.servidor))
        .collect()
}

/// Same rule as [`filter_samples`], applied to the raw name on each record.
pub fn filter_averages<'a>(
    averages: &'a [AverageRecord],
    selection: &Selection,
) -> Vec<&'a AverageRecord> {
    averages
        .iter()
        .filter(|a| selection.includes_server(&a.servidor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregate_store::tests::average;
    use crate::application::sample_store::tests::sample;

    #[test]
    fn test_empty_selection_returns_input_unchanged() {
        let samples = vec![sample("t1", "B", 1.0), sample("t2", "A", 2.0), sample("t3", "B", 3.0)];
        let filtered: Vec<Sample> = filter_samples(&samples, &Selection::default())
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(filtered, samples);
    }

    #[test]
    fn test_filter_compares_canonical_names() {
        let samples = vec![
            sample("t1", "Speedtest by Ookla - ACME - 1234", 1.0),
            sample("t2", "Beta", 2.0),
            sample("t3", "ACME", 3.0),
        ];
        let selection = Selection::default().with_servers(["ACME - 1"]);

        let filtered = filter_samples(&samples, &selection);
        let timestamps: Vec<&str> = filtered.iter().map(|s| s.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["t1", "t3"]);
    }

    #[test]
    fn test_filter_averages() {
        let averages = vec![
            average("Speedtest by Ookla - ACME - 1234", 10.0),
            average("Beta", 20.0),
        ];
        let selection = Selection::default().with_servers(["Beta"]);

        let filtered = filter_averages(&averages, &selection);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].servidor, "Beta");

        assert_eq!(filter_averages(&averages, &Selection::default()).len(), 2);
    }
}
