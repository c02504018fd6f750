// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::macros::datetime;
// self
use snoo_client::{
	_preludet::*,
	error::{Error, ValueError},
	journal::{DiaperKind, FeedingKind, MilkKind, NewDiaperEntry, NewFeedingEntry},
};

fn seeded_client(server: &MockServer) -> snoo_client::Client {
	let client = build_test_client(&server.url("/"), &server.url("/identity"));

	seed_credential(&client, "Bearer seeded", None, Duration::minutes(30));

	client
}

#[tokio::test]
async fn diaper_create_posts_the_expected_body() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/cs/me/v11/journals").json_body(json!({
				"type": "diaper",
				"startTime": "2024-01-01T10:00:00Z",
				"babyId": "b1",
				"userId": "u1",
				"data": { "types": ["pee", "poo"] },
			}));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "_id": "j1" }));
		})
		.await;
	let entry = NewDiaperEntry::new(
		"b1",
		datetime!(2024-01-01 10:00 UTC),
		[DiaperKind::Pee, DiaperKind::Poo],
	)
	.with_user_id("u1");
	let created =
		client.create_diaper_entry(entry).await.expect("Diaper entry creation should succeed.");

	create.assert_async().await;

	assert_eq!(created, json!({ "_id": "j1" }));
}

#[tokio::test]
async fn user_id_is_borrowed_from_recent_diaper_entries() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let tracking = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cs/me/v11/babies/b1/journals/tracking")
				.query_param("journalType", "diaper");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!([{ "_id": "j0", "userId": "u77" }]));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/cs/me/v11/journals").json_body_includes(r#"{"userId": "u77"}"#);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "_id": "j2" }));
		})
		.await;
	let entry = NewFeedingEntry::new("b1", datetime!(2024-01-02 08:30 UTC), FeedingKind::Bottle)
		.with_milk(MilkKind::Formula)
		.with_amount_metric(133.08);

	client.create_feeding_entry(entry).await.expect("Feeding entry creation should succeed.");

	tracking.assert_async().await;
	create.assert_async().await;
}

#[tokio::test]
async fn detection_failure_is_a_value_error() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let tracking = server
		.mock_async(|when, then| {
			when.method(GET).path("/cs/me/v11/babies/b1/journals/tracking");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/cs/me/v11/journals");
			then.status(200).header("content-type", "application/json").json_body(json!({}));
		})
		.await;
	let entry = NewDiaperEntry::new("b1", datetime!(2024-01-01 10:00 UTC), [DiaperKind::Pee]);
	let err = client
		.create_diaper_entry(entry)
		.await
		.expect_err("Detection without recent entries must fail.");

	assert!(matches!(err, Error::Value(ValueError::UserIdUndetected { .. })));
	tracking.assert_async().await;
	create.assert_hits_async(0).await;
}

#[tokio::test]
async fn bottle_feeding_without_amounts_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let tracking = server
		.mock_async(|when, then| {
			when.method(GET).path("/cs/me/v11/babies/b1/journals/tracking");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/cs/me/v11/journals");
			then.status(200).header("content-type", "application/json").json_body(json!({}));
		})
		.await;
	let entry = NewFeedingEntry::new("b1", datetime!(2024-01-02 08:30 UTC), FeedingKind::Bottle);
	let err = client
		.create_feeding_entry(entry)
		.await
		.expect_err("A bottle feeding without amounts must be rejected.");

	assert!(matches!(
		err,
		Error::Value(ValueError::MissingMeasurement { quantity: "amount" })
	));
	tracking.assert_hits_async(0).await;
	create.assert_hits_async(0).await;
}

#[tokio::test]
async fn update_requires_a_complete_entry() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let put = server
		.mock_async(|when, then| {
			when.method(PUT).path("/cs/me/v11/journals/j1");
			then.status(200).header("content-type", "application/json").json_body(json!({}));
		})
		.await;
	let partial = json!({
		"type": "diaper",
		"startTime": "2024-01-01T10:00:00Z",
		"babyId": "b1",
		"data": { "types": ["pee"] },
	});
	let err = client
		.update_journal_entry("j1", partial)
		.await
		.expect_err("A partial update payload must be rejected.");

	assert!(matches!(
		err,
		Error::Value(ValueError::IncompleteEntry { field: "userId" })
	));
	put.assert_hits_async(0).await;
}

#[tokio::test]
async fn update_and_delete_round_trip() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let complete = json!({
		"type": "weight",
		"startTime": "2024-01-02T09:00:00Z",
		"babyId": "b1",
		"userId": "u1",
		"data": { "weightImperial": 7.5, "weightMetric": 212.62 },
	});
	let put = server
		.mock_async(|when, then| {
			when.method(PUT).path("/cs/me/v11/journals/j9").json_body(complete.clone());
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "_id": "j9" }));
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/cs/me/v11/journals/j9");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "_id": "j9" }));
		})
		.await;
	let updated = client
		.update_journal_entry("j9", complete)
		.await
		.expect("A complete update payload should succeed.");

	put.assert_async().await;

	assert_eq!(updated, json!({ "_id": "j9" }));
	assert!(
		client.delete_journal_entry("j9").await.expect("Delete should succeed."),
		"a non-null body confirms the deletion",
	);
	delete.assert_async().await;
}

#[tokio::test]
async fn tracking_windows_use_per_endpoint_precision() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server);
	let grouped = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cs/me/v11/babies/b1/journals/grouped-tracking")
				.query_param("fromDateTime", "2024-01-01T00:00:00.000Z")
				.query_param("toDateTime", "2024-01-02T00:00:00.000Z")
				.query_param("group", "activity");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let typed = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cs/me/v11/babies/b1/journals/tracking")
				.query_param("fromDateTime", "2024-01-01T00:00:00Z")
				.query_param("journalType", "weight");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let from = datetime!(2024-01-01 00:00 UTC);
	let to = datetime!(2024-01-02 00:00 UTC);

	client
		.get_grouped_tracking("b1", from, to, "activity")
		.await
		.expect("Grouped tracking should succeed.");
	client.get_weight_tracking("b1", from, to).await.expect("Weight tracking should succeed.");

	grouped.assert_async().await;
	typed.assert_async().await;
}
