use fhir_rekey_core::{
    rekey_bundle, rekey_value, Bundle, BundleError, IdentifierPolicy, RekeyOptions,
    URN_IDENTIFIER_SYSTEM, URN_UUID_PREFIX,
};
use serde_json::{json, Value};
use std::collections::HashSet;

fn two_record_bundle() -> Value {
    json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [
            {
                "fullUrl": "https://example.org/fhir/Patient/123",
                "resource": {"resourceType": "Patient", "id": "123", "active": true}
            },
            {
                "fullUrl": "https://example.org/fhir/Observation/abc",
                "resource": {
                    "resourceType": "Observation",
                    "id": "abc",
                    "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4"}]},
                    "subject": {"reference": "Patient/123"}
                }
            }
        ]
    })
}

fn urn_of(resource: &Value) -> String {
    format!("{URN_UUID_PREFIX}{}", resource["id"].as_str().unwrap())
}

#[test]
fn two_record_scenario_links_observation_to_new_patient_identity() {
    let (output, outcome) = rekey_value(two_record_bundle(), &RekeyOptions::default()).unwrap();

    let patient = &output["entry"][0]["resource"];
    let observation = &output["entry"][1]["resource"];
    let patient_urn = urn_of(patient);
    let observation_urn = urn_of(observation);

    assert_ne!(patient_urn, observation_urn);
    assert_eq!(output["entry"][0]["fullUrl"], patient_urn);
    assert_eq!(output["entry"][1]["fullUrl"], observation_urn);
    assert_eq!(observation["subject"]["reference"], patient_urn);

    for (resource, urn) in [(patient, &patient_urn), (observation, &observation_urn)] {
        assert_eq!(
            resource["identifier"],
            json!([{"system": URN_IDENTIFIER_SYSTEM, "value": urn}])
        );
    }

    assert!(outcome.unresolved.is_empty());
    assert_eq!(outcome.rewritten_references, 1);
    assert_eq!(outcome.assignments.len(), 2);
    assert_eq!(outcome.assignments[0].id.urn(), patient_urn);
}

#[test]
fn bundle_gets_fresh_id_and_single_identifier() {
    let (output, outcome) = rekey_value(two_record_bundle(), &RekeyOptions::default()).unwrap();

    assert_eq!(output["id"], outcome.bundle_id.raw());
    assert_eq!(
        output["identifier"],
        json!({"system": URN_IDENTIFIER_SYSTEM, "value": outcome.bundle_id.urn()})
    );
    assert_eq!(output["type"], "collection");

    let entry_ids: Vec<_> = outcome.assignments.iter().map(|a| a.id).collect();
    assert!(!entry_ids.contains(&outcome.bundle_id));
}

#[test]
fn existing_bundle_identifier_object_is_preserved() {
    let mut input = two_record_bundle();
    input["identifier"] = json!({"system": "urn:batch", "value": "b-1"});

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    assert_eq!(
        output["identifier"],
        json!([
            {"system": "urn:batch", "value": "b-1"},
            {"system": URN_IDENTIFIER_SYSTEM, "value": outcome.bundle_id.urn()}
        ])
    );
}

#[test]
fn identities_are_pairwise_distinct() {
    let entries: Vec<Value> = (0..50)
        .map(|i| json!({"resource": {"resourceType": "Patient", "id": format!("p{i}")}}))
        .collect();
    let input = json!({"resourceType": "Bundle", "entry": entries});

    let (output, _) = rekey_value(input, &RekeyOptions::default()).unwrap();

    let urls: HashSet<&str> = output["entry"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["fullUrl"].as_str().unwrap())
        .collect();
    assert_eq!(urls.len(), 50);
}

#[test]
fn forward_references_resolve() {
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": {"resourceType": "Encounter", "id": "e1",
                          "subject": {"reference": "Patient/late"}}},
            {"resource": {"resourceType": "Patient", "id": "late"}}
        ]
    });

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    assert_eq!(
        output["entry"][0]["resource"]["subject"]["reference"],
        urn_of(&output["entry"][1]["resource"])
    );
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn absolute_and_locator_references_resolve() {
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"fullUrl": "http://legacy.example/Patient/A",
             "resource": {"resourceType": "Patient", "id": "pat-1"}},
            {"resource": {"resourceType": "Observation", "id": "o1",
                          "subject": {"reference": "http://legacy.example/Patient/A"},
                          "performer": [{"reference": "https://example.org/fhir/Patient/pat-1"}]}}
        ]
    });

    let (output, _) = rekey_value(input, &RekeyOptions::default()).unwrap();

    let patient_urn = urn_of(&output["entry"][0]["resource"]);
    let observation = &output["entry"][1]["resource"];
    assert_eq!(observation["subject"]["reference"], patient_urn);
    assert_eq!(observation["performer"][0]["reference"], patient_urn);
}

#[test]
fn whitespace_corrupted_reference_is_repaired() {
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": {"resourceType": "Patient", "id": "1-2-3"}},
            {"resource": {"resourceType": "Observation", "id": "o1",
                          "subject": {"reference": "Patient/ 1 2 3"}}}
        ]
    });

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    assert_eq!(
        output["entry"][1]["resource"]["subject"]["reference"],
        urn_of(&output["entry"][0]["resource"])
    );
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn canonical_and_contained_references_pass_through() {
    let existing_urn = "urn:uuid:2b1c3d4e-5f60-4a7b-8c9d-0e1f2a3b4c5d";
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": {"resourceType": "MedicationRequest", "id": "mr1",
                          "contained": [{"resourceType": "Medication", "id": "med"}],
                          "medicationReference": {"reference": "#med"},
                          "requester": {"reference": existing_urn}}}
        ]
    });

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    let request = &output["entry"][0]["resource"];
    assert_eq!(request["medicationReference"]["reference"], "#med");
    assert_eq!(request["requester"]["reference"], existing_urn);
    assert_eq!(request["contained"][0]["id"], "med");
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn unresolved_reference_is_kept_and_reported_verbatim() {
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": {"resourceType": "Observation", "id": "o1",
                          "subject": {"reference": "Patient/unknown-id"},
                          "encounter": {"reference": "Encounter/missing"}}}
        ]
    });

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    let observation = &output["entry"][0]["resource"];
    assert_eq!(observation["subject"]["reference"], "Patient/unknown-id");
    let unresolved: Vec<&String> = outcome.unresolved.iter().collect();
    assert_eq!(unresolved, ["Encounter/missing", "Patient/unknown-id"]);
}

#[test]
fn non_reference_fields_are_never_modified() {
    let (output, _) = rekey_value(two_record_bundle(), &RekeyOptions::default()).unwrap();

    assert_eq!(
        output["entry"][1]["resource"]["code"],
        json!({"coding": [{"system": "http://loinc.org", "code": "8867-4"}]})
    );
    assert_eq!(output["entry"][0]["resource"]["active"], true);
}

#[test]
fn container_level_references_are_rewritten() {
    let input = json!({
        "resourceType": "Bundle",
        "link": [{"relation": "self", "reference": "Patient/123"}],
        "entry": [
            {"resource": {"resourceType": "Patient", "id": "123"}}
        ]
    });

    let (output, _) = rekey_value(input, &RekeyOptions::default()).unwrap();

    assert_eq!(
        output["link"][0]["reference"],
        urn_of(&output["entry"][0]["resource"])
    );
}

#[test]
fn field_order_is_preserved() {
    let (output, _) = rekey_value(two_record_bundle(), &RekeyOptions::default()).unwrap();

    let top: Vec<&String> = output.as_object().unwrap().keys().collect();
    assert_eq!(top, ["resourceType", "type", "entry", "id", "identifier"]);

    let entry: Vec<&String> = output["entry"][1].as_object().unwrap().keys().collect();
    assert_eq!(entry, ["fullUrl", "resource"]);

    let observation: Vec<&String> = output["entry"][1]["resource"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(
        observation,
        ["resourceType", "id", "code", "subject", "identifier"]
    );
}

#[test]
fn entries_without_resource_still_get_locators() {
    let input = json!({
        "resourceType": "Bundle",
        "type": "transaction-response",
        "entry": [
            {"response": {"status": "201 Created"}},
            {"resource": "not-an-object"}
        ]
    });

    let (output, outcome) = rekey_value(input, &RekeyOptions::default()).unwrap();

    assert_eq!(output["entry"][0]["fullUrl"], outcome.assignments[0].id.urn());
    assert!(output["entry"][0].get("resource").is_none());
    assert_eq!(output["entry"][1]["resource"], "not-an-object");
    assert_eq!(output["entry"][1]["fullUrl"], outcome.assignments[1].id.urn());
}

#[test]
fn known_types_policy_skips_identifier_for_unknown_types() {
    let input = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": {"resourceType": "Parameters", "id": "params"}},
            {"resource": {"resourceType": "Patient", "id": "p1"}}
        ]
    });
    let options = RekeyOptions {
        identifier_policy: IdentifierPolicy::KnownTypesOnly,
    };

    let (output, outcome) = rekey_value(input, &options).unwrap();

    let parameters = &output["entry"][0]["resource"];
    assert_eq!(parameters["id"], outcome.assignments[0].id.raw());
    assert!(parameters.get("identifier").is_none());
    assert!(output["entry"][1]["resource"]["identifier"].is_array());
}

#[test]
fn malformed_input_is_rejected() {
    let options = RekeyOptions::default();
    assert_eq!(
        rekey_value(json!("Bundle"), &options).unwrap_err(),
        BundleError::NotAnObject
    );
    assert!(matches!(
        rekey_value(json!({"resourceType": "Patient"}), &options).unwrap_err(),
        BundleError::NotABundle { .. }
    ));
    assert_eq!(
        rekey_value(json!({"resourceType": "Bundle", "entry": [1]}), &options).unwrap_err(),
        BundleError::EntryNotObject { index: 0 }
    );
}

#[test]
fn rekeying_a_validated_bundle_in_place() {
    let mut bundle = Bundle::from_value(two_record_bundle()).unwrap();

    let outcome = rekey_bundle(&mut bundle, &RekeyOptions::default());

    assert_eq!(bundle.entry_count(), 2);
    let output = bundle.into_value();
    assert_eq!(output["id"], outcome.bundle_id.raw());
}

#[test]
fn rekeying_output_again_passes_canonical_references_through() {
    let (first, _) = rekey_value(two_record_bundle(), &RekeyOptions::default()).unwrap();
    let (second, outcome) = rekey_value(first.clone(), &RekeyOptions::default()).unwrap();

    assert_ne!(second["entry"][0]["fullUrl"], first["entry"][0]["fullUrl"]);
    assert_eq!(
        second["entry"][1]["resource"]["subject"]["reference"],
        first["entry"][1]["resource"]["subject"]["reference"]
    );
    // Prior URN identifiers are kept next to the new ones.
    assert_eq!(
        second["entry"][0]["resource"]["identifier"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(outcome.rewritten_references, 0);
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn large_numbers_are_written_back_unchanged() {
    let raw = r#"{"resourceType":"Bundle","entry":[{"resource":{"resourceType":"Observation","id":"o1","valueInteger":123456789012345678901234,"valueDecimal":1.50}}]}"#;
    let input: Value = serde_json::from_str(raw).unwrap();

    let (output, _) = rekey_value(input, &RekeyOptions::default()).unwrap();

    let rendered = serde_json::to_string(&output).unwrap();
    assert!(rendered.contains(r#""valueInteger":123456789012345678901234"#));
    assert!(rendered.contains(r#""valueDecimal":1.50"#));
}
