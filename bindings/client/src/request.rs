use serde::Serialize;
use ticket_tunnel_core::prelude::ContractVersion;
use ticket_tunnel_instruments::Phase;

/// The seats a reservation asks for, in the shape the backend contract expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeatSelection {
    #[serde(rename = "seat_number")]
    Single(u32),
    /// Booked or rejected as one unit.
    #[serde(rename = "seat_numbers")]
    Group(Vec<u32>),
}

impl SeatSelection {
    /// The legacy single seat shape is only used for exactly one seat. Groups always use the group
    /// shape, whatever the contract, because the single seat shape cannot express them.
    pub fn for_contract(contract: ContractVersion, seats: &[u32]) -> Self {
        match (contract, seats) {
            (ContractVersion::SingleSeat, [seat]) => SeatSelection::Single(*seat),
            _ => SeatSelection::Group(seats.to_vec()),
        }
    }
}

/// Body of `POST /reservations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRequest {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(flatten)]
    pub seats: SeatSelection,
    pub user_id: String,
    pub user_name: String,
}

/// What a scenario wants sent, before it is turned into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSpec {
    /// Try to book all of these seats as one unit.
    Reserve { seats: Vec<u32> },
    /// Check availability.
    Read,
}

impl RequestSpec {
    pub fn reserve(seats: impl Into<Vec<u32>>) -> Self {
        RequestSpec::Reserve {
            seats: seats.into(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            RequestSpec::Reserve { .. } => Phase::Write,
            RequestSpec::Read => Phase::Read,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(contract: ContractVersion, seats: &[u32]) -> ReservationRequest {
        ReservationRequest {
            event_id: "1".to_string(),
            section_id: match contract {
                ContractVersion::SingleSeat => None,
                ContractVersion::SeatGroups => Some("A".to_string()),
            },
            seats: SeatSelection::for_contract(contract, seats),
            user_id: "user_abc".to_string(),
            user_name: "StressBot".to_string(),
        }
    }

    #[test]
    fn single_seat_contract_body() {
        let body = serde_json::to_value(request(ContractVersion::SingleSeat, &[4821])).unwrap();

        assert_eq!(
            json!({
                "event_id": "1",
                "seat_number": 4821,
                "user_id": "user_abc",
                "user_name": "StressBot",
            }),
            body
        );
    }

    #[test]
    fn seat_group_contract_body() {
        let body =
            serde_json::to_value(request(ContractVersion::SeatGroups, &[20, 21, 22])).unwrap();

        assert_eq!(
            json!({
                "event_id": "1",
                "section_id": "A",
                "seat_numbers": [20, 21, 22],
                "user_id": "user_abc",
                "user_name": "StressBot",
            }),
            body
        );
    }

    #[test]
    fn group_is_never_sent_as_a_single_seat() {
        assert_eq!(
            SeatSelection::Group(vec![1, 2]),
            SeatSelection::for_contract(ContractVersion::SingleSeat, &[1, 2])
        );
        assert_eq!(
            SeatSelection::Group(vec![7]),
            SeatSelection::for_contract(ContractVersion::SeatGroups, &[7])
        );
    }

    #[test]
    fn spec_phase() {
        assert_eq!(Phase::Write, RequestSpec::reserve([1]).phase());
        assert_eq!(Phase::Read, RequestSpec::Read.phase());
    }
}
