use pretty_assertions::assert_eq;

use rxscan::prescription::{extract_medicines, scan_mentions, MedicineRecord};

fn record(name: &str, dose: &str, frequency: &str, duration: &str, instructions: &str) -> MedicineRecord {
    MedicineRecord {
        name: name.to_string(),
        dose: dose.to_string(),
        frequency: frequency.to_string(),
        duration: duration.to_string(),
        instructions: instructions.to_string(),
    }
}

#[test]
fn test_full_line_is_captured() {
    let medicines = extract_medicines("Paracetamol 650mg 2 times daily 5 days after food");

    assert_eq!(
        medicines,
        vec![record("Paracetamol", "650mg", "2 times daily", "5 days", "after food")]
    );
}

#[test]
fn test_capsule_dose_keeps_trailing_clauses() {
    let medicines = extract_medicines(
        "Amoxil 1 capsule 3 times daily 5 days\nDoxy 2 capsules 2 times daily 7 days before food",
    );

    assert_eq!(
        medicines,
        vec![
            record("Amoxil", "1 capsule", "3 times daily", "5 days", "after food"),
            record("Doxy", "2 capsules", "2 times daily", "7 days", "before food"),
        ]
    );
}

#[test]
fn test_missing_fields_get_defaults() {
    let medicines = extract_medicines("Cetirizine 10mg");

    assert_eq!(
        medicines,
        vec![record("Cetirizine", "10mg", "1 time daily", "7 days", "after food")]
    );
}

#[test]
fn test_name_without_dose_is_not_a_medicine() {
    assert_eq!(extract_medicines("Cough syrup"), vec![MedicineRecord::sentinel()]);
}

#[test]
fn test_lowercase_name_is_not_a_medicine() {
    assert_eq!(
        extract_medicines("amoxicillin 500mg twice daily"),
        vec![MedicineRecord::sentinel()]
    );
}

#[test]
fn test_empty_text_yields_sentinel() {
    let medicines = extract_medicines("");
    assert_eq!(medicines.len(), 1);
    assert!(medicines[0].is_sentinel());
}

#[test]
fn test_order_follows_text() {
    let text = "Rx\nAmoxicillin 500mg 3 times daily\nParacetamol 650mg before bedtime\n";
    let names: Vec<String> = extract_medicines(text).into_iter().map(|m| m.name).collect();

    assert_eq!(names, vec!["Amoxicillin", "Paracetamol"]);
}

#[test]
fn test_duplicates_are_kept() {
    let medicines = extract_medicines("Cetirizine 10mg, Cetirizine 10mg");

    assert_eq!(medicines.len(), 2);
    assert_eq!(medicines[0], medicines[1]);
}

#[test]
fn test_realistic_prescription() {
    let text = "\
Dr. A. Sharma, MBBS
Date: 12/03/2024

1. Amoxicillin 500 mg 3x daily - 5 days
2. Pantoprazole 40mg 1 / day before breakfast
3. Cetirizine 10 mg
Review after 1 week
";

    let medicines = extract_medicines(text);

    assert_eq!(
        medicines,
        vec![
            record("Amoxicillin", "500 mg", "3x daily", "5 days", "after food"),
            record("Pantoprazole", "40mg", "1 / day", "7 days", "before breakfast"),
            record("Cetirizine", "10 mg", "1 time daily", "7 days", "after food"),
        ]
    );
}

#[test]
fn test_matched_records_are_fully_populated() {
    let text = "Ibuprofen 400mg with food\nMetformin 500mg 2 times daily 3 months";

    for medicine in extract_medicines(text) {
        assert!(!medicine.name.is_empty());
        assert!(!medicine.dose.is_empty());
        assert!(!medicine.frequency.is_empty());
        assert!(!medicine.duration.is_empty());
        assert!(!medicine.instructions.is_empty());
    }
}

#[test]
fn test_never_empty_for_arbitrary_text() {
    let inputs = [
        "",
        "   \n\t",
        "12345",
        "mg mg mg",
        "Ünïcödé 500mg",
        "A 1mg",
        "Take 2 tablets",
        "---,,,---",
    ];

    for input in inputs {
        assert!(!extract_medicines(input).is_empty(), "empty result for {input:?}");
    }
}

#[test]
fn test_mentions_report_spans() {
    let text = "Use Ibuprofen 400mg then rest";
    let mentions: Vec<_> = scan_mentions(text).collect();

    assert_eq!(mentions.len(), 1);
    assert_eq!(&text[mentions[0].start..mentions[0].end], "Ibuprofen 400mg");
}
