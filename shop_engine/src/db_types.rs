use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
pub use shop_common::Price;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserId         ---------------------------------------------------------
/// The login identity of a user. This is the key used for notification recipients and live-channel sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for UserId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Customer => write!(f, "CUSTOMER"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "CUSTOMER" => Ok(Self::Customer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------         User          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub marketing_consent: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub marketing_consent: bool,
}

impl NewUser {
    pub fn customer<S: Into<String>>(user_id: S, username: S) -> Self {
        Self { user_id: UserId::from(user_id), username: username.into(), role: Role::Customer, marketing_consent: false }
    }

    pub fn admin<S: Into<String>>(user_id: S, username: S) -> Self {
        Self { user_id: UserId::from(user_id), username: username.into(), role: Role::Admin, marketing_consent: false }
    }

    pub fn with_marketing_consent(mut self, consent: bool) -> Self {
        self.marketing_consent = consent;
        self
    }
}

//--------------------------------------       ProductId       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub stock: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Price, stock: i64) -> Self {
        Self { name: name.into(), price, stock }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// A bank transfer order that is waiting for the transfer to be confirmed.
    PaymentPending,
    /// Payment has been received and the order is waiting to be shipped.
    Ordered,
    /// The order has been handed over to the courier.
    Delivering,
    /// The order has reached the customer. This is a terminal state.
    Delivered,
    /// The order was cancelled by the customer or an admin. This is a terminal state.
    Canceled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }

    /// The status reached by applying `action` to an order in this status, or `None` if the action is not allowed.
    pub fn apply(&self, action: OrderAction) -> Option<OrderStatusType> {
        action.allowed_from().contains(self).then(|| action.target())
    }

    /// The customer-facing description of the status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PaymentPending => "Awaiting payment",
            Self::Ordered => "Order completed",
            Self::Delivering => "In delivery",
            Self::Delivered => "Delivered",
            Self::Canceled => "Order canceled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentPending => write!(f, "PAYMENT_PENDING"),
            Self::Ordered => write!(f, "ORDERED"),
            Self::Delivering => write!(f, "DELIVERING"),
            Self::Delivered => write!(f, "DELIVERED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT_PENDING" => Ok(Self::PaymentPending),
            "ORDERED" => Ok(Self::Ordered),
            "DELIVERING" => Ok(Self::Delivering),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELED" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to PAYMENT_PENDING");
            OrderStatusType::PaymentPending
        })
    }
}

//--------------------------------------      OrderAction      ---------------------------------------------------------
/// The actions that move an order through its lifecycle.
///
/// | From \ Action   | pay     | ship       | deliver   | cancel   |
/// |-----------------|---------|------------|-----------|----------|
/// | PAYMENT_PENDING | ORDERED | ✗          | ✗         | CANCELED |
/// | ORDERED         | ✗       | DELIVERING | ✗         | CANCELED |
/// | DELIVERING      | ✗       | ✗          | DELIVERED | CANCELED |
/// | DELIVERED       | ✗       | ✗          | ✗         | ✗        |
/// | CANCELED        | ✗       | ✗          | ✗         | ✗        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Pay,
    Ship,
    Deliver,
    Cancel,
}

impl OrderAction {
    pub fn allowed_from(&self) -> &'static [OrderStatusType] {
        use OrderStatusType::*;
        match self {
            Self::Pay => &[PaymentPending],
            Self::Ship => &[Ordered],
            Self::Deliver => &[Delivering],
            Self::Cancel => &[PaymentPending, Ordered, Delivering],
        }
    }

    pub fn target(&self) -> OrderStatusType {
        match self {
            Self::Pay => OrderStatusType::Ordered,
            Self::Ship => OrderStatusType::Delivering,
            Self::Deliver => OrderStatusType::Delivered,
            Self::Cancel => OrderStatusType::Canceled,
        }
    }
}

impl Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pay => write!(f, "pay"),
            Self::Ship => write!(f, "ship"),
            Self::Deliver => write!(f, "deliver"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

//--------------------------------------     PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card payments are confirmed synchronously at checkout.
    #[default]
    Card,
    /// Bank transfers are confirmed later by a call to `pay`.
    BankTransfer,
}

impl PaymentMethod {
    /// The status a freshly created order enters with this payment method.
    pub fn initial_status(&self) -> OrderStatusType {
        match self {
            Self::Card => OrderStatusType::Ordered,
            Self::BankTransfer => OrderStatusType::PaymentPending,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "CARD"),
            Self::BankTransfer => write!(f, "BANK_TRANSFER"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------    OrderId / Number   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The externally visible order reference, e.g. the one quoted on receipts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------     ShippingInfo      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_request: Option<String>,
}

impl ShippingInfo {
    pub fn new<S: Into<String>>(recipient_name: S, recipient_phone: S, shipping_address: S) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            recipient_phone: recipient_phone.into(),
            shipping_address: shipping_address.into(),
            shipping_request: None,
        }
    }

    pub fn with_request<S: Into<String>>(mut self, request: S) -> Self {
        self.shipping_request = Some(request.into());
        self
    }
}

//--------------------------------------       LineItem        ---------------------------------------------------------
/// A product snapshot taken at checkout. Price and name never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: i64,
}

impl LineItem {
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl NewLineItem {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

/// A line item with its price and name already resolved from the catalog, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: i64,
}

impl PricedLineItem {
    /// The line's price, or `None` if it does not fit in a `Price`.
    pub fn line_total(&self) -> Option<Price> {
        self.unit_price.checked_mul(self.quantity)
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub total_price: Price,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub hidden: bool,
    #[sqlx(flatten)]
    pub shipping: ShippingInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewLineItem>,
    pub payment_method: PaymentMethod,
    pub shipping: ShippingInfo,
}

impl NewOrder {
    pub fn new<U: Into<UserId>>(user_id: U, items: Vec<NewLineItem>, payment_method: PaymentMethod) -> Self {
        Self { user_id: user_id.into(), items, payment_method, shipping: ShippingInfo::default() }
    }

    pub fn with_shipping(mut self, shipping: ShippingInfo) -> Self {
        self.shipping = shipping;
        self
    }
}

/// Everything needed to write an order and its line items in one go.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub payment_method: PaymentMethod,
    pub shipping: ShippingInfo,
    pub items: Vec<PricedLineItem>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// The sum of all line totals, or `None` if any step of the calculation overflows.
    pub fn total_price(&self) -> Option<Price> {
        self.items.iter().try_fold(Price::default(), |total, item| item.line_total()?.checked_add(total))
    }

    pub fn initial_status(&self) -> OrderStatusType {
        self.payment_method.initial_status()
    }
}

//--------------------------------------   NotificationType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Order,
    Qna,
    Review,
    QnaReply,
    ReviewReply,
    Marketing,
    Advertisement,
    Notice,
    AdminOrder,
    AdminQna,
    AdminReview,
}

impl NotificationType {
    pub const ALL: [NotificationType; 11] = [
        Self::Order,
        Self::Qna,
        Self::Review,
        Self::QnaReply,
        Self::ReviewReply,
        Self::Marketing,
        Self::Advertisement,
        Self::Notice,
        Self::AdminOrder,
        Self::AdminQna,
        Self::AdminReview,
    ];

    /// Types that only reach users who opted in to marketing.
    pub fn is_promotional(&self) -> bool {
        matches!(self, Self::Marketing | Self::Advertisement)
    }

    /// Types addressed to the admin team rather than to customers.
    pub fn is_admin_type(&self) -> bool {
        matches!(self, Self::AdminOrder | Self::AdminQna | Self::AdminReview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "ORDER",
            Self::Qna => "QNA",
            Self::Review => "REVIEW",
            Self::QnaReply => "QNA_REPLY",
            Self::ReviewReply => "REVIEW_REPLY",
            Self::Marketing => "MARKETING",
            Self::Advertisement => "ADVERTISEMENT",
            Self::Notice => "NOTICE",
            Self::AdminOrder => "ADMIN_ORDER",
            Self::AdminQna => "ADMIN_QNA",
            Self::AdminReview => "ADMIN_REVIEW",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| ConversionError(format!("Invalid notification type: {s}")))
    }
}

//--------------------------------------    NotificationId     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------     Notification      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
    /// The id of the entity that caused the notification (order, QnA thread, review ...)
    pub reference_id: Option<i64>,
    /// The product the causing entity belongs to, if any
    pub product_id: Option<ProductId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
    pub reference_id: Option<i64>,
    pub product_id: Option<ProductId>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn new<S: Into<String>>(
        recipient: UserId,
        notification_type: NotificationType,
        title: S,
        body: S,
    ) -> Self {
        Self {
            recipient,
            title: title.into(),
            body: body.into(),
            notification_type,
            reference_id: None,
            product_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference_id: Option<i64>) -> Self {
        self.reference_id = reference_id;
        self
    }

    pub fn with_product(mut self, product_id: Option<ProductId>) -> Self {
        self.product_id = product_id;
        self
    }
}
