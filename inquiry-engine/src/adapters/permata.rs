//! Permata speaks its own envelope: no bearer token, no request signature

use super::{codes, decode, ParsedResponse};
use crate::models::{BankConfig, InquiryRequest, NormalizedBankResponse};
use crate::transport::Headers;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct InquiryEnvelope<'a> {
    #[serde(rename = "AcctInqRq")]
    account_inquiry: InquiryRequestBody<'a>,
}

#[derive(Serialize)]
struct InquiryRequestBody<'a> {
    #[serde(rename = "MsgRqHdr")]
    header: RequestHeader<'a>,
    #[serde(rename = "InqInfo")]
    info: RequestInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestHeader<'a> {
    request_time_stamp: &'a str,
    #[serde(rename = "CustReffID")]
    cust_reff_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestInfo<'a> {
    account_number: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(dead_code)]
struct ResponseHeader {
    response_timestamp: String,
    #[serde(rename = "CustReffID")]
    cust_reff_id: String,
    status_code: String,
    status_desc: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InternalEnvelope {
    #[serde(rename = "AcctInqRs")]
    account_inquiry: InternalInquiryResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InternalInquiryResponse {
    #[serde(rename = "MsgRsHdr")]
    header: ResponseHeader,
    #[serde(rename = "InqInfo")]
    info: InternalInquiryInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(dead_code)]
struct InternalInquiryInfo {
    account_number: String,
    account_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TransferEnvelope {
    #[serde(rename = "OlXferInqRs")]
    transfer_inquiry: TransferInquiryResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TransferInquiryResponse {
    #[serde(rename = "MsgRsHdr")]
    header: ResponseHeader,
    #[serde(rename = "InqInfo")]
    info: TransferInquiryInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(dead_code)]
struct TransferInquiryInfo {
    to_account: String,
    to_account_full_name: String,
    bank_id: String,
    bank_name: String,
}

pub(super) fn build_body(request: &InquiryRequest, timestamp: &str) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(&InquiryEnvelope {
        account_inquiry: InquiryRequestBody {
            header: RequestHeader {
                request_time_stamp: timestamp,
                cust_reff_id: &request.partner_reference_no,
            },
            info: RequestInfo {
                account_number: &request.beneficiary_account,
            },
        },
    })?;
    Ok(body)
}

pub(super) fn headers(request: &InquiryRequest, timestamp: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".into(), "application/json".into());
    headers.insert("OrganizationName".into(), request.company_id.clone());
    headers.insert("X-TIMESTAMP".into(), timestamp.to_string());
    headers
}

/// Own-bank answers use `AcctInqRs`; transfers to other banks `OlXferInqRs`
pub(super) fn parse(cfg: &BankConfig, body: &[u8]) -> ParsedResponse {
    if cfg.bank_code == codes::PERMATA {
        decode(body, "/AcctInqRs/MsgRsHdr/StatusDesc", |res: InternalEnvelope| {
            NormalizedBankResponse {
                account_name: res.account_inquiry.info.account_name,
                response_message: res.account_inquiry.header.status_desc,
            }
        })
    } else {
        decode(
            body,
            "/OlXferInqRs/MsgRsHdr/StatusDesc",
            |res: TransferEnvelope| NormalizedBankResponse {
                account_name: res.transfer_inquiry.info.to_account_full_name,
                response_message: res.transfer_inquiry.header.status_desc,
            },
        )
    }
}
