use super::{decode, service_type, ParsedResponse};
use crate::models::{InquiryRequest, NormalizedBankResponse};
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InternalInquiryRequest<'a> {
    partner_reference_no: &'a str,
    beneficiary_account_no: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalInquiryRequest<'a> {
    beneficiary_bank_code: &'a str,
    beneficiary_account_no: &'a str,
    partner_reference_no: &'a str,
    additional_info: AdditionalInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdditionalInfo {
    inquiry_service: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(dead_code)]
struct InquiryResponse {
    response_code: String,
    response_message: String,
    reference_no: String,
    partner_reference_no: String,
    beneficiary_account_name: String,
    beneficiary_account_no: String,
    beneficiary_bank_code: String,
}

pub(super) fn build_body(request: &InquiryRequest, internal: bool) -> Result<Vec<u8>> {
    let body = if internal {
        serde_json::to_vec(&InternalInquiryRequest {
            partner_reference_no: &request.partner_reference_no,
            beneficiary_account_no: &request.beneficiary_account,
        })?
    } else {
        serde_json::to_vec(&ExternalInquiryRequest {
            beneficiary_bank_code: &request.bank_code,
            beneficiary_account_no: &request.beneficiary_account,
            partner_reference_no: &request.partner_reference_no,
            additional_info: AdditionalInfo {
                inquiry_service: service_type(request, "2", "1"),
            },
        })?
    };
    Ok(body)
}

pub(super) fn parse(body: &[u8]) -> ParsedResponse {
    decode(body, "/responseMessage", |res: InquiryResponse| {
        NormalizedBankResponse {
            account_name: res.beneficiary_account_name,
            response_message: res.response_message,
        }
    })
}
