use crate::sparql::{Literal, SparqlClient, SparqlRow, SparqlTable};
use async_trait::async_trait;
use munigraph_core::{EventRecord, EventSource, MuniGraphError, Result, SourceConfig};
use tracing::info;

/// Every municipal change event, one row per (parent version, child version) pair.
///
/// District/canton reassignment rows are included; `reconcile` uses them to close
/// interval gaps and then drops them.
pub const MUNICIPAL_EVENTS_QUERY: &str = r#"
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX gont: <https://gont.ch/>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ech71: <http://classifications.data.admin.ch/code/ech0071/>

SELECT DISTINCT ?parent_name ?parent_admission ?parent_abolition ?child_name ?child_admission ?child_abolition ?eventdate ?ab_label ?ad_label
WHERE {
  ?event a gont:MunicipalityChangeEvent ;
      gont:id ?eventid ;
      gont:date ?eventdate .

  ?parent a gont:MunicipalityVersion ;
      gont:shortName ?parent_name ;
      gont:abolitionMode ?abolition_mode ;
      gont:abolitionEvent ?event .

  ?child a gont:MunicipalityVersion ;
      gont:shortName ?child_name ;
      gont:admissionMode ?admission_mode ;
      gont:admissionEvent ?event .

  ?parent gont:admissionEvent ?_parent_admission .
  ?_parent_admission gont:date ?__parent_admission .
  ?parent gont:abolitionEvent ?_parent_abolition .
  ?_parent_abolition gont:date ?__parent_abolition .

  ?child gont:admissionEvent ?_child_admission .
  ?_child_admission gont:date ?__child_admission .

  OPTIONAL {
    ?child gont:abolitionEvent ?_child_abolition .
    ?_child_abolition gont:date ?__child_abolition .
    BIND (year(?__child_abolition) AS ?child_abolition) .
  }

  ?abolition_mode skos:prefLabel ?ab_label .
  ?admission_mode skos:prefLabel ?ad_label .

  FILTER(?admission_mode IN (ech71:20, ech71:21, ech71:23, ech71:24, ech71:26)) .
  FILTER(?abolition_mode IN (ech71:23, ech71:24, ech71:26, ech71:29)) .

  BIND (year(?__parent_abolition) AS ?parent_abolition) .
  BIND (year(?__parent_admission) AS ?parent_admission) .
  BIND (year(?__child_admission) AS ?child_admission) .
}
ORDER BY ?eventid
"#;

/// Event source backed by the federal classifications SPARQL endpoint.
#[derive(Debug)]
pub struct MunicipalEventSource {
    client: SparqlClient,
}

impl MunicipalEventSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        Ok(Self {
            client: SparqlClient::new(config)?,
        })
    }

    pub fn with_client(client: SparqlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventSource for MunicipalEventSource {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>> {
        let table = self.client.send_query(MUNICIPAL_EVENTS_QUERY).await?;
        let records = records_from_table(&table)?;
        info!(
            endpoint = self.client.endpoint(),
            records = records.len(),
            "fetched municipal events"
        );
        Ok(records)
    }

    fn name(&self) -> &str {
        "classifications.data.admin.ch"
    }
}

/// Maps normalized result rows onto event records.
pub fn records_from_table(table: &SparqlTable) -> Result<Vec<EventRecord>> {
    table.rows().map(|row| record_from_row(&row)).collect()
}

fn record_from_row(row: &SparqlRow<'_>) -> Result<EventRecord> {
    Ok(EventRecord {
        parent_name: text(row, "parent_name")?,
        parent_admission: year(row, "parent_admission")?,
        parent_abolition: year(row, "parent_abolition")?,
        child_name: text(row, "child_name")?,
        child_admission: year(row, "child_admission")?,
        child_abolition: optional_year(row, "child_abolition")?,
        event_date: row
            .get("eventdate")
            .and_then(Literal::as_date)
            .ok_or_else(|| missing(row, "eventdate"))?,
        abolition_label: text(row, "ab_label")?,
        admission_label: text(row, "ad_label")?,
    })
}

fn missing(row: &SparqlRow<'_>, column: &str) -> MuniGraphError {
    MuniGraphError::External(format!(
        "row {}: missing or mistyped column '{}'",
        row.index(),
        column
    ))
}

fn text(row: &SparqlRow<'_>, column: &str) -> Result<String> {
    row.get(column)
        .and_then(Literal::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(row, column))
}

fn year(row: &SparqlRow<'_>, column: &str) -> Result<i32> {
    optional_year(row, column)?.ok_or_else(|| missing(row, column))
}

fn optional_year(row: &SparqlRow<'_>, column: &str) -> Result<Option<i32>> {
    match row.get(column) {
        None => Ok(None),
        Some(literal) => literal
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| missing(row, column)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    const INT: &str = "http://www.w3.org/2001/XMLSchema#integer";
    const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    fn response(child_abolition: Option<&str>) -> serde_json::Value {
        let mut binding = json!({
            "parent_name": { "type": "literal", "value": "Olten" },
            "parent_admission": { "type": "literal", "value": "1850", "datatype": INT },
            "parent_abolition": { "type": "literal", "value": "1900", "datatype": INT },
            "child_name": { "type": "literal", "value": "NeuOlten" },
            "child_admission": { "type": "literal", "value": "1900", "datatype": INT },
            "eventdate": { "type": "literal", "value": "1900-01-01", "datatype": DATE },
            "ab_label": { "type": "literal", "value": "Gebietsänderung Gemeinde", "xml:lang": "de" },
            "ad_label": { "type": "literal", "value": "Gebietsänderung Gemeinde", "xml:lang": "de" }
        });
        if let Some(year) = child_abolition {
            binding["child_abolition"] = json!({ "type": "literal", "value": year, "datatype": INT });
        }
        json!({
            "head": { "vars": [
                "parent_name", "parent_admission", "parent_abolition", "child_name",
                "child_admission", "child_abolition", "eventdate", "ab_label", "ad_label"
            ]},
            "results": { "bindings": [binding] }
        })
    }

    #[test]
    fn maps_rows_to_records() {
        let table = SparqlTable::from_json(response(Some("1990"))).unwrap();
        let records = records_from_table(&table).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.parent_name, "Olten");
        assert_eq!((r.parent_admission, r.parent_abolition), (1850, 1900));
        assert_eq!(r.child_name, "NeuOlten");
        assert_eq!(r.child_admission, 1900);
        assert_eq!(r.child_abolition, Some(1990));
        assert_eq!(r.event_date, NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert_eq!(r.abolition_label, "Gebietsänderung Gemeinde");
    }

    #[test]
    fn open_child_interval_stays_unbound() {
        let table = SparqlTable::from_json(response(None)).unwrap();
        let records = records_from_table(&table).unwrap();
        assert_eq!(records[0].child_abolition, None);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let mut doc = response(None);
        doc["results"]["bindings"][0]
            .as_object_mut()
            .unwrap()
            .remove("parent_name");
        let table = SparqlTable::from_json(doc).unwrap();
        let err = records_from_table(&table).unwrap_err();
        assert!(err.to_string().contains("parent_name"));
    }
}
