use api_auth::ApiClient;
use chrono::{DateTime, Utc};
use common::{
    error::Res,
    http::{ApiRequest, path_segment},
};

use crate::{
    dtos::{
        page::{Page, decode_page},
        payment::{PaymentDto, PaymentVerificationDto},
    },
    models::payment::{Payment, PaymentStatus},
};

pub const PAYMENTS_PATH: &str = "/payments";

#[derive(Debug, Clone, Default)]
pub struct PaymentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<PaymentStatus>,
    pub member_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list_payments(client: &ApiClient, query: &PaymentQuery) -> Res<Page<Payment>> {
    let mut request = ApiRequest::get(PAYMENTS_PATH);
    if let Some(page) = query.page {
        request = request.query("page", page);
    }
    if let Some(limit) = query.limit {
        request = request.query("limit", limit);
    }
    if let Some(status) = query.status {
        request = request.query("status", status.as_str());
    }
    if let Some(member_id) = &query.member_id {
        request = request.query("memberId", member_id);
    }
    if let Some(from) = query.from {
        request = request.query("startDate", from.to_rfc3339());
    }
    if let Some(to) = query.to {
        request = request.query("endDate", to.to_rfc3339());
    }

    let response = client.send(request).await?;
    decode_page::<PaymentDto>(&response)?.try_map(Payment::try_from)
}

/// Asks the backend to confirm `reference` with the payment provider.
pub async fn verify_payment(client: &ApiClient, reference: &str) -> Res<PaymentVerificationDto> {
    let reference = path_segment(reference)?;
    client
        .send_json(ApiRequest::get(format!("{}/verify/{}", PAYMENTS_PATH, reference)))
        .await
}
