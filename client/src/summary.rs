use courier_shared::{Category, RoutePayload, TrafficLevel};

/// Side-panel route summary, derived once per redraw from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub total_distance_km: f64,
    pub total_time: String,
    pub traffic_delay_text: Option<String>,
    /// Share of route legs per traffic level, in severity order.
    pub traffic_mix: Vec<TrafficShare>,
    /// One entry per stop, trailing return-to-start leg excluded.
    pub stops: Vec<StopEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficShare {
    pub level: TrafficLevel,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopEntry {
    pub index: usize,
    pub address: Option<String>,
    pub category: Category,
    pub time_window: Option<(String, String)>,
    pub estimated_arrival: Option<String>,
}

impl RouteSummary {
    pub fn from_payload(payload: &RoutePayload) -> Self {
        let stops = payload
            .stops()
            .iter()
            .enumerate()
            .map(|(index, _)| {
                let detail = payload.location_details.get(&index);
                let address = detail
                    .map(|d| d.address())
                    .or_else(|| payload.addresses.get(index).cloned());
                StopEntry {
                    index,
                    address,
                    category: detail.map(|d| d.category).unwrap_or_default(),
                    time_window: detail.and_then(|d| {
                        d.time_window()
                            .map(|(start, end)| (start.to_string(), end.to_string()))
                    }),
                    estimated_arrival: detail.and_then(|d| d.estimated_arrival.clone()),
                }
            })
            .collect();

        Self {
            total_distance_km: payload.total_distance,
            total_time: payload.total_time.clone(),
            traffic_delay_text: payload
                .traffic_delay_text
                .clone()
                .filter(|_| payload.has_traffic_data),
            traffic_mix: traffic_mix(payload),
            stops,
        }
    }

    pub fn distance_label(&self) -> String {
        format!("{} km", self.total_distance_km)
    }
}

/// Percentage badges per traffic level, from the per-leg conditions list.
/// Legs without a recognized level are left out of the total.
fn traffic_mix(payload: &RoutePayload) -> Vec<TrafficShare> {
    let mut counts = [0u32; 4];
    let mut total = 0u32;
    for condition in &payload.traffic_conditions {
        if let Some(level) = condition.level.filter(|l| *l <= 3) {
            counts[level as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return Vec::new();
    }

    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .filter_map(|(level, count)| {
            TrafficLevel::from_level(level as u8).map(|level| TrafficShare {
                level,
                percent: (f64::from(*count) / f64::from(total) * 100.0).round() as u32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use courier_shared::{
        Category, LocationDetail, LonLat, RoutePayload, TrafficCondition, TrafficLevel,
    };

    use super::RouteSummary;

    fn two_stop_payload() -> RoutePayload {
        RoutePayload {
            coordinates: vec![LonLat(21.0, 52.2), LonLat(21.1, 52.3)],
            addresses: vec!["A".to_string(), "B".to_string()],
            total_distance: 5.2,
            total_time: "12 min".to_string(),
            ..RoutePayload::default()
        }
    }

    #[test]
    fn summary_reflects_distance_time_and_addresses() {
        let summary = RouteSummary::from_payload(&two_stop_payload());
        assert_eq!(summary.distance_label(), "5.2 km");
        assert_eq!(summary.total_time, "12 min");
        assert_eq!(summary.stops.len(), 2);
        assert_eq!(summary.stops[0].address.as_deref(), Some("A"));
        assert_eq!(summary.stops[1].address.as_deref(), Some("B"));
    }

    #[test]
    fn closed_loop_drops_the_return_entry() {
        let mut payload = two_stop_payload();
        payload.coordinates.push(LonLat(21.0, 52.2));
        payload.addresses.push("A".to_string());

        let summary = RouteSummary::from_payload(&payload);
        assert_eq!(summary.stops.len(), 2);
    }

    #[test]
    fn location_details_enrich_stop_entries() {
        let mut payload = two_stop_payload();
        payload.location_details.insert(
            1,
            LocationDetail {
                street: "Marszalkowska".to_string(),
                number: "1".to_string(),
                city: "Warszawa".to_string(),
                category: Category::Office,
                time_window_start: Some("08:00".to_string()),
                time_window_end: Some("10:00".to_string()),
                estimated_arrival: Some("08:45".to_string()),
            },
        );

        let summary = RouteSummary::from_payload(&payload);
        let stop = &summary.stops[1];
        assert_eq!(stop.address.as_deref(), Some("Marszalkowska 1, Warszawa"));
        assert_eq!(stop.category, Category::Office);
        assert_eq!(
            stop.time_window,
            Some(("08:00".to_string(), "10:00".to_string()))
        );
        assert_eq!(stop.estimated_arrival.as_deref(), Some("08:45"));
    }

    #[test]
    fn traffic_mix_percentages_round_per_level() {
        let mut payload = two_stop_payload();
        payload.traffic_conditions = vec![
            TrafficCondition { level: Some(0) },
            TrafficCondition { level: Some(0) },
            TrafficCondition { level: Some(3) },
            TrafficCondition { level: None },
        ];

        let summary = RouteSummary::from_payload(&payload);
        assert_eq!(summary.traffic_mix.len(), 2);
        assert_eq!(summary.traffic_mix[0].level, TrafficLevel::Free);
        assert_eq!(summary.traffic_mix[0].percent, 67);
        assert_eq!(summary.traffic_mix[1].level, TrafficLevel::Heavy);
        assert_eq!(summary.traffic_mix[1].percent, 33);
    }

    #[test]
    fn delay_text_requires_traffic_data_flag() {
        let mut payload = two_stop_payload();
        payload.traffic_delay_text = Some("No delays".to_string());
        payload.has_traffic_data = false;
        assert!(RouteSummary::from_payload(&payload).traffic_delay_text.is_none());

        payload.has_traffic_data = true;
        assert_eq!(
            RouteSummary::from_payload(&payload).traffic_delay_text.as_deref(),
            Some("No delays")
        );
    }
}
