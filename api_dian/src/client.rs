use common::error::{AppError, Res};
use db::models::{customer::Customer, dian::DianConfiguration, order::Order};
use oauth2::{
    ClientId, ClientSecret, ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Thin client of the electronic invoicing provider. Only the calls the
/// order workflow needs are covered.
pub struct InvoicingClient<'a> {
    http: &'a reqwest::Client,
    config: &'a DianConfiguration,
}

/// Invoice data kept on the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedInvoice {
    pub number: String,
    pub cufe: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvoicePayload {
    pub numbering_range_id: Option<i32>,
    pub reference_code: String,
    pub observation: Option<String>,
    pub payment_method_code: &'static str,
    pub customer: InvoiceCustomer,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceCustomer {
    pub identification: String,
    pub names: String,
    pub company: Option<String>,
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceItem {
    pub code_reference: String,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    pub tax_rate: &'static str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BillData {
    bill: Bill,
}

#[derive(Debug, Deserialize)]
struct Bill {
    number: String,
    cufe: Option<String>,
}

/// Customers without NIT are invoiced as final consumer.
const FINAL_CONSUMER_ID: &str = "222222222222";
const CASH_PAYMENT: &str = "10";

/// One line per order: the app tracks amounts, not products.
pub fn invoice_payload(
    order: &Order,
    customer: &Customer,
    numbering_range_id: Option<i32>,
) -> InvoicePayload {
    InvoicePayload {
        numbering_range_id,
        reference_code: order.id.to_string(),
        observation: order.notes.clone(),
        payment_method_code: CASH_PAYMENT,
        customer: InvoiceCustomer {
            identification: customer
                .nit
                .clone()
                .filter(|nit| !nit.trim().is_empty())
                .unwrap_or_else(|| FINAL_CONSUMER_ID.to_string()),
            names: customer.name.clone(),
            company: customer.business_name.clone(),
            address: customer.address.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        },
        items: vec![InvoiceItem {
            code_reference: order.id.simple().to_string(),
            name: format!("Pedido {}", order.id.simple()),
            quantity: 1,
            price: order.amount,
            tax_rate: "0.00",
        }],
    }
}

fn upstream(action: &str, error: impl std::fmt::Display) -> AppError {
    AppError::BadGateway(format!("El proveedor de facturación falló al {}: {}", action, error))
}

impl<'a> InvoicingClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a DianConfiguration) -> Self {
        InvoicingClient { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Resource-owner password grant against the provider.
    async fn access_token(&self) -> Res<String> {
        let token_url = TokenUrl::new(self.endpoint("/oauth/token"))
            .map_err(|e| AppError::BadRequest(format!("URL de facturación inválida: {}", e)))?;
        let client = BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
            .set_token_uri(token_url);

        let token = client
            .exchange_password(
                &ResourceOwnerUsername::new(self.config.username.clone()),
                &ResourceOwnerPassword::new(self.config.password.clone()),
            )
            .request_async(self.http)
            .await
            .map_err(|e| upstream("autenticar", e))?;

        Ok(token.access_token().secret().to_string())
    }

    async fn check(response: reqwest::Response, action: &str) -> Res<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Invoicing provider answered {} while trying to {}: {}", status, action, body);
        Err(upstream(action, status))
    }

    pub async fn create_invoice(&self, order: &Order, customer: &Customer) -> Res<IssuedInvoice> {
        let token = self.access_token().await?;
        let payload = invoice_payload(order, customer, self.config.numbering_range_id);

        let response = self
            .http
            .post(self.endpoint("/v1/bills/validate"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        let envelope: Envelope<BillData> = Self::check(response, "crear la factura")
            .await?
            .json()
            .await
            .map_err(|e| upstream("leer la factura", e))?;

        Ok(IssuedInvoice {
            number: envelope.data.bill.number,
            cufe: envelope.data.bill.cufe,
        })
    }

    /// Provider listing, passed through as returned.
    pub async fn list_bills(&self, page: u32) -> Res<Value> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.endpoint("/v1/bills"))
            .query(&[("page", page)])
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response, "listar las facturas")
            .await?
            .json()
            .await
            .map_err(|e| upstream("leer las facturas", e))
    }

    pub async fn send_bill_email(&self, number: &str, email: &str) -> Res<()> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.endpoint(&format!("/v1/bills/send-email/{}", number)))
            .bearer_auth(token)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        Self::check(response, "enviar la factura").await?;
        Ok(())
    }
}
