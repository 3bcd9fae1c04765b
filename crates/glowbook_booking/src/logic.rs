// --- File: crates/glowbook_booking/src/logic.rs ---
use chrono::{DateTime, Utc};
use glowbook_cal::{CalError, Scheduler};
use glowbook_common::services::{BookingRequest, BookingResult, BoxFuture};
use glowbook_common::{validate_contact, ContactDetails, Reservation, SlotSelection};
use glowbook_db::{
    Booking, BookingRepository, BookingStatus, NewBooking, PaymentStatus, SqlBookingRepository,
};
use glowbook_stripe::pricing::{parse_price_cents, quote};
use glowbook_stripe::{
    DiscountValidation, PaymentOption, PriceQuote, StripeError, StripePaymentService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::{error, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::BookingError;
use crate::handlers::BookingState;
use crate::redirect::verification_url;
use crate::token::{issue_token, read_token, BookingClaims};

// Payment intent metadata keys
const META_SERVICE_ID: &str = "service_id";
const META_SERVICE_SLUG: &str = "service_slug";
const META_SERVICE_NAME: &str = "service_name";
const META_EVENT_TYPE_ID: &str = "event_type_id";
const META_SLOT_START: &str = "slot_start";
const META_TIMEZONE: &str = "timezone";
const META_RESERVATION_ID: &str = "reservation_id";
const META_PAYMENT_OPTION: &str = "payment_option";
const META_DISCOUNT_CODE: &str = "discount_code";
const META_BASE_AMOUNT: &str = "base_amount";
const META_DISCOUNT_AMOUNT: &str = "discount_amount";
const META_EMAIL: &str = "email";
const META_NAME: &str = "name";

/// Promotion code lookup, split out so the flow can run against a mock.
pub trait DiscountCodes: Send + Sync {
    fn validate<'a>(
        &'a self,
        code: &'a str,
        amount: i64,
        currency: &'a str,
    ) -> BoxFuture<'a, DiscountValidation, StripeError>;
}

impl DiscountCodes for StripePaymentService {
    fn validate<'a>(
        &'a self,
        code: &'a str,
        amount: i64,
        currency: &'a str,
    ) -> BoxFuture<'a, DiscountValidation, StripeError> {
        Box::pin(self.validate_discount(code, amount, currency))
    }
}

// --- Request / response types ---

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateIntentRequest {
    #[cfg_attr(feature = "openapi", schema(example = "signature-facial"))]
    pub service_slug: String,
    pub slot: SlotSelection,
    pub reservation_id: String,
    pub contact: ContactDetails,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub payment_option: PaymentOption,
    /// Required for deposits: the balance is due at the appointment
    #[serde(default)]
    pub deposit_acknowledged: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateIntentResponse {
    pub payment_intent_id: String,
    /// Handed to the card confirmation step
    pub client_secret: String,
    pub currency: String,
    pub quote: PriceQuote,
    pub discount_code: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTokenRequest {
    pub payment_intent_id: String,
    pub slot: SlotSelection,
    #[serde(default)]
    pub reservation_id: Option<String>,
    pub contact: ContactDetails,
    /// Amount the client confirmed, in cents
    pub amount: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Verification page with the booking query parameters
    pub redirect_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RedeemRequest {
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RedeemResponse {
    pub booking_uid: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub service_name: String,
    /// The stored record; absent when it could not be updated after booking
    pub booking: Option<Booking>,
    /// True when this payment had already been redeemed
    pub already_booked: bool,
}

impl RedeemResponse {
    fn existing(booking: Booking) -> Self {
        let end_time = booking
            .metadata
            .get("end_time")
            .and_then(|v| v.as_str())
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Self {
            booking_uid: booking.external_booking_uid.clone(),
            start_time: booking.booking_date,
            end_time,
            service_name: booking.service_name.clone(),
            booking: Some(booking),
            already_booked: true,
        }
    }
}

// --- Orchestration ---

/// Confirms the reservation is still held for exactly this slot.
pub async fn verify_reservation(
    scheduler: &Scheduler,
    reservation_id: &str,
    slot: &SlotSelection,
    now: DateTime<Utc>,
) -> Result<Reservation, BookingError> {
    let reservation = match scheduler.get_reservation(reservation_id).await {
        Ok(reservation) => reservation,
        Err(CalError::ReservationNotFound(_)) | Err(CalError::ReservationExpired(_)) => {
            return Err(BookingError::ReservationLost(reservation_id.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if reservation.expires_at.is_some_and(|expiry| expiry <= now) {
        return Err(BookingError::ReservationLost(reservation_id.to_string()));
    }
    if !reservation.matches(slot) {
        return Err(BookingError::ReservationMismatch);
    }
    Ok(reservation)
}

pub async fn create_intent(
    state: &BookingState,
    request: CreateIntentRequest,
    now: DateTime<Utc>,
) -> Result<CreateIntentResponse, BookingError> {
    let contact = validate_contact(&request.contact)?;
    let catalog = state.catalog()?;
    let scheduler = state.scheduler()?;
    let payments = state.payments()?;

    let service = catalog
        .find_service(&request.service_slug)
        .await?
        .ok_or_else(|| BookingError::UnknownService(request.service_slug.clone()))?;
    let event_type_id = service
        .event_type_id
        .ok_or_else(|| BookingError::NotBookable(service.slug.clone()))?;
    if event_type_id != request.slot.event_type_id {
        return Err(BookingError::InvalidRequest(
            "The selected time belongs to a different service.".to_string(),
        ));
    }
    if request.slot.start_time <= now {
        return Err(BookingError::InvalidRequest(
            "That time has already passed.".to_string(),
        ));
    }

    verify_reservation(scheduler, &request.reservation_id, &request.slot, now).await?;

    let currency = state.config.studio.currency.to_lowercase();
    let base_amount = parse_price_cents(&service.price)?;
    let discount_code = request
        .discount_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());
    let (discount, discount_code) = match discount_code {
        None => (0, None),
        Some(code) => {
            let validation = state
                .discounts()?
                .validate(code, base_amount, &currency)
                .await?;
            if !validation.valid {
                return Err(BookingError::DiscountRejected(validation.message.unwrap_or_else(
                    || "This discount code is invalid or has expired.".to_string(),
                )));
            }
            (validation.discount_amount, Some(validation.code))
        }
    };

    let quote = quote(
        base_amount,
        discount,
        request.payment_option,
        request.deposit_acknowledged,
    )?;
    if quote.amount_due <= 0 {
        return Err(BookingError::InvalidRequest(
            "Nothing is due online for this booking. Please contact the studio.".to_string(),
        ));
    }

    let mut metadata = HashMap::from([
        (META_SERVICE_ID.to_string(), service.id.clone()),
        (META_SERVICE_SLUG.to_string(), service.slug.clone()),
        (META_SERVICE_NAME.to_string(), service.name.clone()),
        (META_EVENT_TYPE_ID.to_string(), event_type_id.to_string()),
        (
            META_SLOT_START.to_string(),
            request.slot.start_time.to_rfc3339(),
        ),
        (META_TIMEZONE.to_string(), request.slot.timezone.clone()),
        (
            META_RESERVATION_ID.to_string(),
            request.reservation_id.clone(),
        ),
        (
            META_PAYMENT_OPTION.to_string(),
            request.payment_option.as_str().to_string(),
        ),
        (META_BASE_AMOUNT.to_string(), quote.base_amount.to_string()),
        (
            META_DISCOUNT_AMOUNT.to_string(),
            quote.discount_amount.to_string(),
        ),
        (META_EMAIL.to_string(), contact.email.clone()),
        (META_NAME.to_string(), contact.name.clone()),
    ]);
    if let Some(code) = &discount_code {
        metadata.insert(META_DISCOUNT_CODE.to_string(), code.clone());
    }

    let description = format!("{} · {}", service.name, request.slot.label);
    let intent = payments
        .create_payment_intent(quote.amount_due, &currency, Some(&description), metadata)
        .await?;
    let client_secret = intent.client_secret.ok_or_else(|| {
        BookingError::Internal(format!("payment intent {} has no client secret", intent.id))
    })?;

    Ok(CreateIntentResponse {
        payment_intent_id: intent.id,
        client_secret,
        currency,
        quote,
        discount_code,
    })
}

fn parse_start(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// The token may only name the client the intent was created for.
fn same_contact(metadata: &HashMap<String, String>, contact: &ContactDetails) -> bool {
    let name_matches = metadata
        .get(META_NAME)
        .is_some_and(|name| name.trim() == contact.name.trim());
    let email_matches = metadata
        .get(META_EMAIL)
        .is_some_and(|email| email.trim().eq_ignore_ascii_case(contact.email.trim()));
    name_matches && email_matches
}

pub async fn create_token(
    state: &BookingState,
    request: CreateTokenRequest,
    now: DateTime<Utc>,
) -> Result<CreateTokenResponse, BookingError> {
    let contact = validate_contact(&request.contact)?;
    let booking_config = state.booking_config()?;
    let payments = state.payments()?;

    let intent = payments
        .retrieve_payment_intent(&request.payment_intent_id)
        .await?;
    if !intent.is_paid() {
        return Err(BookingError::PaymentIncomplete(intent.status));
    }
    if intent.amount != request.amount {
        return Err(BookingError::AmountMismatch);
    }

    let metadata = &intent.metadata;
    let event_type_id = metadata
        .get(META_EVENT_TYPE_ID)
        .and_then(|v| v.parse::<i64>().ok());
    let slot_start = parse_start(metadata.get(META_SLOT_START));
    if event_type_id != Some(request.slot.event_type_id)
        || slot_start != Some(request.slot.start_time)
    {
        return Err(BookingError::PaymentMismatch);
    }
    if !same_contact(metadata, &contact) {
        return Err(BookingError::PaymentMismatch);
    }

    let payment_option = match metadata.get(META_PAYMENT_OPTION).map(String::as_str) {
        Some("deposit") => PaymentOption::Deposit,
        _ => PaymentOption::Full,
    };
    let claims = BookingClaims {
        payment_intent_id: intent.id.clone(),
        event_type_id: request.slot.event_type_id,
        slot_start: request.slot.start_time,
        timezone: metadata
            .get(META_TIMEZONE)
            .cloned()
            .unwrap_or_else(|| request.slot.timezone.clone()),
        reservation_id: metadata
            .get(META_RESERVATION_ID)
            .cloned()
            .or(request.reservation_id),
        service_id: metadata.get(META_SERVICE_ID).cloned().unwrap_or_default(),
        service_name: metadata.get(META_SERVICE_NAME).cloned().unwrap_or_default(),
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
        notes: contact.notes,
        amount: intent.amount,
        currency: intent.currency.clone(),
        payment_option,
        issued_at: now,
        expires_at: now,
    };

    let (token, claims) = issue_token(booking_config, claims, now)?;
    let redirect_url = verification_url(&booking_config.verify_url, &token, &claims)?;
    info!(
        payment_intent_id = %claims.payment_intent_id,
        "[Booking] Token issued, valid until {}",
        claims.expires_at
    );

    Ok(CreateTokenResponse {
        token,
        expires_at: claims.expires_at,
        redirect_url,
    })
}

fn pending_booking(claims: &BookingClaims) -> NewBooking {
    let payment_status = match claims.payment_option {
        PaymentOption::Full => PaymentStatus::Paid,
        PaymentOption::Deposit => PaymentStatus::DepositPaid,
    };
    NewBooking {
        service_id: claims.service_id.clone(),
        service_name: claims.service_name.clone(),
        client_name: claims.name.clone(),
        client_email: claims.email.clone(),
        client_phone: claims.phone.clone(),
        booking_date: claims.slot_start,
        payment_status,
        payment_intent_id: Some(claims.payment_intent_id.clone()),
        external_booking_uid: None,
        amount_paid: claims.amount,
        currency: claims.currency.clone(),
        metadata: json!({
            "timezone": claims.timezone,
            "reservation_id": claims.reservation_id,
            "payment_option": claims.payment_option.as_str(),
            "notes": claims.notes,
        }),
    }
}

fn scheduler_request(claims: &BookingClaims) -> BookingRequest {
    let metadata = HashMap::from([
        (
            "payment_intent_id".to_string(),
            claims.payment_intent_id.clone(),
        ),
        (META_SERVICE_ID.to_string(), claims.service_id.clone()),
        (
            META_PAYMENT_OPTION.to_string(),
            claims.payment_option.as_str().to_string(),
        ),
    ]);
    BookingRequest {
        event_type_id: claims.event_type_id,
        start_time: claims.slot_start,
        timezone: claims.timezone.clone(),
        attendee: ContactDetails {
            name: claims.name.clone(),
            email: claims.email.clone(),
            phone: claims.phone.clone(),
            notes: claims.notes.clone(),
        },
        reservation_id: claims.reservation_id.clone(),
        metadata,
    }
}

/// Answer for a payment whose claim is held by another redemption.
async fn already_redeemed(
    repository: &SqlBookingRepository,
    claims: &BookingClaims,
) -> Result<RedeemResponse, BookingError> {
    match repository
        .find_by_payment_intent(&claims.payment_intent_id)
        .await?
    {
        Some(existing) if existing.status != BookingStatus::Pending => {
            info!(
                payment_intent_id = %claims.payment_intent_id,
                "[Booking] Token already redeemed as booking {}",
                existing.id
            );
            Ok(RedeemResponse::existing(existing))
        }
        _ => {
            info!(
                payment_intent_id = %claims.payment_intent_id,
                "[Booking] Redemption already in progress"
            );
            Err(BookingError::RedeemInProgress)
        }
    }
}

async fn confirm_booking(
    repository: &SqlBookingRepository,
    claims: &BookingClaims,
    result: &BookingResult,
) -> Option<Booking> {
    let metadata = json!({
        "end_time": result.end_time.to_rfc3339(),
        "timezone": claims.timezone,
        "reservation_id": claims.reservation_id,
        "payment_option": claims.payment_option.as_str(),
        "notes": claims.notes,
    });
    match repository
        .confirm_claim(
            &claims.payment_intent_id,
            &result.uid,
            result.start_time,
            metadata,
        )
        .await
    {
        Ok(Some(booking)) => Some(booking),
        // The scheduler booking stands; only the local record is behind
        Ok(None) => {
            error!(
                payment_intent_id = %claims.payment_intent_id,
                "[Booking] Booking {} created but its claim was gone",
                result.uid
            );
            None
        }
        Err(e) => {
            error!(
                payment_intent_id = %claims.payment_intent_id,
                "[Booking] Booking {} created but not recorded: {}",
                result.uid,
                e
            );
            None
        }
    }
}

/// Redeems a booking token. The payment intent is claimed in the store
/// before the scheduler is called, so each payment books at most once.
pub async fn redeem_booking(
    state: &BookingState,
    request: RedeemRequest,
) -> Result<RedeemResponse, BookingError> {
    let booking_config = state.booking_config()?;
    let claims = read_token(booking_config, &request.token)?;
    let repository = state.bookings()?;
    let scheduler = state.scheduler()?;

    if repository.claim(pending_booking(&claims)).await?.is_none() {
        return already_redeemed(repository, &claims).await;
    }

    let result = match scheduler.create_booking(scheduler_request(&claims)).await {
        Ok(result) => result,
        Err(e) => {
            // Free the payment so the client can try again
            if let Err(release) = repository.release_claim(&claims.payment_intent_id).await {
                error!(
                    payment_intent_id = %claims.payment_intent_id,
                    "[Booking] Could not release claim after failed booking: {}",
                    release
                );
            }
            return Err(e.into());
        }
    };
    info!(
        payment_intent_id = %claims.payment_intent_id,
        "[Booking] Created booking {} at {}",
        result.uid,
        result.start_time
    );

    let booking = confirm_booking(repository, &claims, &result).await;

    Ok(RedeemResponse {
        booking_uid: Some(result.uid),
        start_time: result.start_time,
        end_time: Some(result.end_time),
        service_name: claims.service_name,
        booking,
        already_booked: false,
    })
}
