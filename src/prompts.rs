//! The prompt contract for the structuring service.
//!
//! Centralising the prompt here keeps it single-sourced: the request-shape
//! selection in [`crate::pipeline::normalize`] never needs to change when the
//! extraction instructions do, and unit tests can assert on the contract
//! without calling a live model.
//!
//! The contract the prompt enforces:
//! * copy values verbatim from the document
//! * use `"N/A"` for fields absent from the document
//! * preserve source date formatting
//! * include any non-canonical fields discovered
//! * emit JSON only — no prose, no code fences

/// Build the structuring instruction embedding the full document text.
///
/// The JSON example names every canonical field (see
/// [`crate::fields::CANONICAL_FIELDS`]) so the service knows the exact schema
/// to populate.
pub fn extraction_prompt(document_text: &str) -> String {
    format!(
        r#"You are a document processing assistant specialized in extracting structured data from government license renewal forms.

Extract ALL information from the following license renewal form document. The document content is:

{document_text}

Analyze the document and extract all fields and their corresponding values. Return the data as a JSON object with the following structure. Map the fields from the document to these standard fields:

{{
    "applicant_name": "Full name of the applicant/license holder",
    "license_number": "License number or ID",
    "license_type": "Type of license (e.g., Driver's License, Professional License, etc.)",
    "expiry_date": "Current expiration date of the license",
    "renewal_date": "Date of renewal application or renewal date",
    "address": "Complete address (street, city, state, zip)",
    "contact_number": "Phone number or contact number",
    "email": "Email address",
    "payment_status": "Payment status (Paid, Pending, etc.)",
    "payment_amount": "Amount paid (if mentioned)",
    "transaction_id": "Transaction or payment reference number (if mentioned)",
    "date_of_birth": "Date of birth (if mentioned)",
    "previous_violations": "Any violations or disciplinary actions (if mentioned)",
    "additional_notes": "Any additional information, notes, or remarks"
}}

Important instructions:
1. Extract values exactly as they appear in the document
2. If a field is not present in the document, set it to "N/A"
3. For dates, preserve the format as shown in the document
4. Include ALL fields you find, even if they don't match the standard fields above - add them as additional fields
5. Return ONLY valid JSON, no markdown formatting, no code blocks, no additional text before or after the JSON
6. Ensure all string values are properly quoted and escaped if needed"#
    )
}
