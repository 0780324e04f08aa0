use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// A locality as registered in the postal directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub location: String,
    #[serde(deserialize_with = "postcode_string")]
    pub postcode: String,
    pub state: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Locality {
    pub fn is_named(&self, normalized_name: &str) -> bool {
        self.location.to_uppercase() == normalized_name
    }

    pub fn has_postcode(&self, postcode: &str) -> bool {
        self.postcode == postcode
    }

    pub fn in_state(&self, normalized_state: &str) -> bool {
        self.state.to_uppercase() == normalized_state
    }
}

/// The directory sends postcodes either as text or as a bare number,
/// which drops the leading zero of NT postcodes.
fn postcode_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => format!("{:04}", number),
    })
}

/// Body of a directory search response.
///
/// `{"localities": {"locality": [..]}}` for several results, a bare object
/// for exactly one, and `{"localities": ""}` when nothing matched.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    localities: Option<Localities>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Localities {
    Found {
        #[serde(default)]
        locality: Option<OneOrMany>,
    },
    Blank(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Locality>),
    One(Box<Locality>),
}

impl SearchResponse {
    pub fn into_localities(self) -> Vec<Locality> {
        match self.localities {
            Some(Localities::Found { locality: Some(OneOrMany::Many(list)) }) => list,
            Some(Localities::Found { locality: Some(OneOrMany::One(single)) }) => vec![*single],
            Some(Localities::Blank(text)) => {
                if !text.trim().is_empty() {
                    warn!("unexpected locality directory text in place of results: {}", text);
                }
                Vec::new()
            }
            Some(Localities::Found { locality: None }) | None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: serde_json::Value) -> Vec<Locality> {
        serde_json::from_value::<SearchResponse>(body).unwrap().into_localities()
    }

    #[test]
    fn decodes_locality_list() {
        let localities = decode(json!({
            "localities": {
                "locality": [
                    {"category": "Delivery Area", "id": 632, "latitude": -37.82, "location": "RICHMOND", "longitude": 145.0, "postcode": 3121, "state": "VIC"},
                    {"category": "Delivery Area", "id": 633, "location": "BURNLEY", "postcode": "3121", "state": "VIC"}
                ]
            }
        }));

        assert_eq!(localities.len(), 2);
        assert_eq!(localities[0].location, "RICHMOND");
        assert_eq!(localities[0].postcode, "3121");
        assert_eq!(localities[0].latitude, Some(-37.82));
        assert_eq!(localities[1].latitude, None);
        assert_eq!(localities[1].category.as_deref(), Some("Delivery Area"));
    }

    #[test]
    fn decodes_single_locality_object() {
        let localities = decode(json!({
            "localities": {
                "locality": {"id": 1, "location": "DARWIN", "postcode": 800, "state": "NT"}
            }
        }));

        assert_eq!(localities.len(), 1);
        // zero padding restored for numeric postcodes
        assert_eq!(localities[0].postcode, "0800");
    }

    #[test]
    fn blank_or_missing_localities_decode_to_nothing() {
        assert!(decode(json!({"localities": ""})).is_empty());
        assert!(decode(json!({"localities": {}})).is_empty());
        assert!(decode(json!({})).is_empty());
    }

    #[test]
    fn malformed_locality_list_is_an_error() {
        let body = json!({"localities": {"locality": [{"location": "RICHMOND"}]}});

        assert!(serde_json::from_value::<SearchResponse>(body).is_err());
    }

    #[test]
    fn serializes_absent_coordinates_as_null() {
        let locality = Locality {
            id: None,
            location: "RICHMOND".to_string(),
            postcode: "3121".to_string(),
            state: "VIC".to_string(),
            latitude: None,
            longitude: None,
            category: None,
        };

        assert_eq!(
            serde_json::to_value(&locality).unwrap(),
            json!({"location": "RICHMOND", "postcode": "3121", "state": "VIC", "latitude": null, "longitude": null, "category": null})
        );
    }
}
