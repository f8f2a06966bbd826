use super::{decode, service_type, ParsedResponse};
use crate::models::{InquiryRequest, NormalizedBankResponse};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InternalInquiryRequest<'a> {
    beneficiary_account_no: &'a str,
    additional_info: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalInquiryRequest<'a> {
    beneficiary_bank_code: &'a str,
    beneficiary_account_no: &'a str,
    additional_info: BTreeMap<&'static str, &'static str>,
}

/// Shared by the internal and external success envelopes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(dead_code)]
struct InquiryResponse {
    response_code: String,
    response_message: String,
    reference_no: String,
    beneficiary_account_no: String,
    beneficiary_account_name: String,
    beneficiary_bank_code: String,
    beneficiary_bank_name: String,
    currency: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(dead_code)]
struct ErrorResponse {
    response_code: String,
    response_message: String,
}

pub(super) fn build_body(request: &InquiryRequest, internal: bool) -> Result<Vec<u8>> {
    let body = if internal {
        serde_json::to_vec(&InternalInquiryRequest {
            beneficiary_account_no: &request.beneficiary_account,
            additional_info: BTreeMap::from([("channel", ""), ("deviceId", "")]),
        })?
    } else {
        serde_json::to_vec(&ExternalInquiryRequest {
            beneficiary_bank_code: &request.bank_code,
            beneficiary_account_no: &request.beneficiary_account,
            additional_info: BTreeMap::from([
                ("serviceCode", service_type(request, "81", "16")),
                ("deviceId", ""),
                ("channel", ""),
            ]),
        })?
    };
    Ok(body)
}

/// Non-200 answers carry the error envelope, never the success one
pub(super) fn parse(status: u16, body: &[u8]) -> ParsedResponse {
    if status != 200 {
        return decode(body, "/responseMessage", |res: ErrorResponse| {
            NormalizedBankResponse {
                account_name: String::new(),
                response_message: res.response_message,
            }
        });
    }

    decode(body, "/responseMessage", |res: InquiryResponse| {
        NormalizedBankResponse {
            account_name: res.beneficiary_account_name,
            response_message: res.response_message,
        }
    })
}
