use samael::schema::Assertion;
use std::collections::HashMap;

/// Attribute values decoded from an assertion, keyed by attribute name.
///
/// Attributes that carry a FriendlyName are reachable under that name too, so
/// a mapping can refer to either `urn:oid:0.9.2342.19200300.100.1.3` or `mail`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Claims(HashMap<String, Vec<String>>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.0.insert(name.into(), values);
    }

    /// All values of a claim; empty when the claim is missing.
    pub fn values(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.values(name).iter().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Collects every attribute of the assertion's attribute statements. Repeated
/// attributes accumulate their values; value-less entries are skipped.
pub fn extract_claims(assertion: &Assertion) -> Claims {
    let mut claims: HashMap<String, Vec<String>> = HashMap::new();
    let Some(stmts) = &assertion.attribute_statements else {
        return Claims(claims);
    };
    for stmt in stmts {
        for attr in &stmt.attributes {
            let values: Vec<String> = attr
                .values
                .iter()
                .filter_map(|v| v.value.clone())
                .collect();
            if values.is_empty() {
                continue;
            }
            let names = attr.name.iter().chain(attr.friendly_name.iter());
            for name in names {
                claims
                    .entry(name.clone())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }
    }
    Claims(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samael::attribute::{Attribute, AttributeValue};
    use samael::schema::{AttributeStatement, Issuer};

    const GROUPS: &str = "https://schemas.myapp.com/claims/groups";
    const MAIL_OID: &str = "urn:oid:0.9.2342.19200300.100.1.3";

    fn make_assertion(stmts: Option<Vec<AttributeStatement>>) -> Assertion {
        Assertion {
            id: "_test".into(),
            issue_instant: chrono::Utc::now(),
            version: "2.0".into(),
            issuer: Issuer::default(),
            signature: None,
            subject: None,
            conditions: None,
            authn_statements: None,
            attribute_statements: stmts,
        }
    }

    fn make_attr(name: &str, values: &[&str]) -> Attribute {
        Attribute {
            friendly_name: None,
            name: Some(name.into()),
            name_format: None,
            values: values
                .iter()
                .map(|v| AttributeValue {
                    attribute_type: None,
                    value: Some(v.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn keeps_every_value_of_multi_valued_claims() {
        let assertion = make_assertion(Some(vec![AttributeStatement {
            attributes: vec![
                make_attr("email", &["ana@example.com"]),
                make_attr(GROUPS, &["App-Users", "App-Admins"]),
            ],
        }]));

        let claims = extract_claims(&assertion);
        assert_eq!(claims.len(), 2);
        assert_eq!(claims.first("email"), Some("ana@example.com"));
        assert_eq!(claims.values(GROUPS), ["App-Users", "App-Admins"]);
        assert!(claims.contains_value(GROUPS, "App-Admins"));
    }

    #[test]
    fn friendly_name_is_an_alias() {
        let mut attr = make_attr(MAIL_OID, &["bo@example.edu"]);
        attr.friendly_name = Some("mail".into());
        let assertion = make_assertion(Some(vec![AttributeStatement {
            attributes: vec![attr],
        }]));

        let claims = extract_claims(&assertion);
        assert_eq!(claims.first(MAIL_OID), Some("bo@example.edu"));
        assert_eq!(claims.first("mail"), Some("bo@example.edu"));
    }

    #[test]
    fn repeated_attributes_accumulate() {
        let assertion = make_assertion(Some(vec![
            AttributeStatement {
                attributes: vec![make_attr(GROUPS, &["App-Users"])],
            },
            AttributeStatement {
                attributes: vec![make_attr(GROUPS, &["App-Admins"])],
            },
        ]));

        let claims = extract_claims(&assertion);
        assert_eq!(claims.values(GROUPS), ["App-Users", "App-Admins"]);
    }

    #[test]
    fn empty_attribute_statements() {
        let claims = extract_claims(&make_assertion(None));
        assert!(claims.is_empty());
        assert!(claims.values(GROUPS).is_empty());
    }

    #[test]
    fn attribute_without_value() {
        let assertion = make_assertion(Some(vec![AttributeStatement {
            attributes: vec![make_attr("email", &[])],
        }]));

        assert!(extract_claims(&assertion).is_empty());
    }
}
