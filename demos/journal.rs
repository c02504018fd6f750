//! Demonstrates the full client flow against a local mock service: password
//! login, a throttled device refresh, and a couple of journal operations.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use snoo_client::{
	Client,
	endpoint::ServiceDescriptor,
	http::ReqwestTransport,
	journal::{DiaperKind, FeedingKind, MilkKind, NewDiaperEntry, NewFeedingEntry},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/identity");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"AuthenticationResult": {
					"IdToken": "demo-id-token",
					"RefreshToken": "demo-refresh",
					"ExpiresIn": 3600,
					"TokenType": "Bearer",
				}
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/us/me/v10/me");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "userId": "demo-user", "givenName": "Demo" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/us/me/v10/babies");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!([{ "_id": "demo-baby", "babyName": "Sam" }]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/hds/me/v11/devices");
			then.status(200).header("content-type", "application/json").json_body(json!([{
				"serialNumber": "SN-DEMO",
				"name": "Nursery",
				"online": true,
				"on": false,
				"firmwareVersion": "v10.2.1",
				"baby": "demo-baby",
			}]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/ds/devices/SN-DEMO/configs");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "weaning": false }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/analytics/sessions/last");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "startTime": "2024-01-01T19:00:00.000Z" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/cs/me/v11/journals");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "_id": "journal-entry-1" }));
		})
		.await;

	let descriptor = ServiceDescriptor::default()
		.with_base_endpoint(Url::parse(&server.url("/"))?)
		.with_identity_endpoint(Url::parse(&server.url("/identity"))?);
	let client = Client::with_transport(
		descriptor,
		ReqwestTransport::default(),
		"demo@example.com",
		"demo-password",
	);

	client.authenticate(true).await?;

	let devices = client.update_device_info().await?;

	for (serial_number, device) in &devices {
		println!("device {serial_number}: name={:?} online={:?}", device.name, device.online);
	}

	let now = OffsetDateTime::now_utc();
	let diaper = client
		.create_diaper_entry(
			NewDiaperEntry::new("demo-baby", now, [DiaperKind::Pee])
				.with_user_id("demo-user")
				.with_note("before the nap"),
		)
		.await?;

	println!("created diaper entry: {diaper}");

	let feeding = client
		.create_feeding_entry(
			NewFeedingEntry::new("demo-baby", now - Duration::hours(2), FeedingKind::Bottle)
				.with_milk(MilkKind::Formula)
				.with_amount_imperial(4.5)
				.with_user_id("demo-user"),
		)
		.await?;

	println!("created feeding entry: {feeding}");

	Ok(())
}
