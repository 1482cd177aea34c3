use resource_actor::mock::{create_mock_client, expect_get, MockClient};
use resource_actor::ActorClient;
use rust_decimal_macros::dec;
use storefront::clients::{OrderClient, UserClient};
use storefront::model::{
    Address, NotificationPreferences, OrderCreate, OrderStatus, PaymentMethod, Principal,
    ProductId, Role, User, UserId,
};
use storefront::order_actor::{self, OrderError, TransitionOutcome};
use storefront::pricing::{price_lines, PricingConfig, ResolvedLine};

fn customer(id: u32) -> User {
    User {
        id: UserId(id),
        name: "Meera".to_string(),
        email: Some("meera@example.com".to_string()),
        phone: None,
        role: Role::Customer,
        preferences: NotificationPreferences::default(),
    }
}

fn order_for(user_id: UserId) -> OrderCreate {
    let summary = price_lines(
        &PricingConfig::default(),
        vec![ResolvedLine::Regular {
            product_id: ProductId(1),
            name: "Vetiver Rain".to_string(),
            unit_price: dec!(400),
            quantity: 2,
        }],
        Address::new("Meera", "221 MG Road", "Bengaluru", "Karnataka", "560001"),
        None,
    );
    OrderCreate {
        user_id,
        summary,
        payment_method: PaymentMethod::Card,
        payment_id: Some("pay_42".to_string()),
    }
}

/// Real Order actor with a mocked User actor as its context.
#[tokio::test]
async fn test_order_actor_with_mocked_user_directory() {
    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_get(UserId(1)).return_ok(Some(customer(1)));

    let (order_actor, order_resource) = order_actor::new();
    let order_client = OrderClient::new(order_resource);
    let handle = tokio::spawn(order_actor.run(UserClient::new(user_mock.client())));

    let order_id = order_client
        .create_order(order_for(UserId(1)))
        .await
        .expect("order should be created");

    let order = order_client.require(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, dec!(946));
    assert_eq!(order.lines[0].unit_price, dec!(400));

    user_mock.verify();
    drop(order_client);
    handle.await.unwrap();
}

/// The owner check reads the user by id before anything is stored.
#[tokio::test]
async fn test_order_creation_looks_up_the_owner() {
    let (users, mut user_requests) = create_mock_client::<User>(4);
    let (order_actor, order_resource) = order_actor::new();
    let orders = OrderClient::new(order_resource);
    let handle = tokio::spawn(order_actor.run(UserClient::new(users)));

    let creating = tokio::spawn({
        let orders = orders.clone();
        async move { orders.create_order(order_for(UserId(5))).await }
    });

    let (id, reply) = expect_get(&mut user_requests).await.unwrap();
    assert_eq!(id, UserId(5));
    reply.send(Ok(Some(customer(5)))).unwrap();

    let order_id = creating.await.unwrap().unwrap();
    assert_eq!(orders.require(order_id).await.unwrap().user_id, UserId(5));

    drop(orders);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_order_for_unknown_user_is_rejected() {
    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_get(UserId(9)).return_ok(None);

    let (order_actor, order_resource) = order_actor::new();
    let order_client = OrderClient::new(order_resource);
    let handle = tokio::spawn(order_actor.run(UserClient::new(user_mock.client())));

    let err = order_client
        .create_order(order_for(UserId(9)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::UnknownUser(_)), "got {err:?}");

    user_mock.verify();
    drop(order_client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_transitions_follow_table_and_roles() {
    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_get(UserId(1)).return_ok(Some(customer(1)));

    let (order_actor, order_resource) = order_actor::new();
    let orders = OrderClient::new(order_resource);
    let handle = tokio::spawn(order_actor.run(UserClient::new(user_mock.client())));

    let id = orders.create_order(order_for(UserId(1))).await.unwrap();
    let owner = Principal::customer(UserId(1));
    let operator = Principal::operator(UserId(100));

    // Customers cannot push an order forward.
    let err = orders
        .transition(id, OrderStatus::Confirmed, owner, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Forbidden(_)));

    // Skipping steps is invalid even for operators.
    let err = orders
        .transition(id, OrderStatus::Shipped, operator, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped
        }
    );

    for to in [OrderStatus::Confirmed, OrderStatus::Processing] {
        let outcome = orders.transition(id, to, operator, None).await.unwrap();
        assert_eq!(outcome.order().status, to);
    }

    // Repeating the current status is a no-op.
    let again = orders
        .transition(id, OrderStatus::Processing, operator, None)
        .await
        .unwrap();
    assert!(matches!(again, TransitionOutcome::Unchanged(_)));
    assert_eq!(again.change(), None);

    let shipped = orders
        .transition(id, OrderStatus::Shipped, operator, Some("AWB-778".to_string()))
        .await
        .unwrap();
    assert_eq!(
        shipped.change(),
        Some((OrderStatus::Processing, OrderStatus::Shipped))
    );
    assert_eq!(shipped.order().tracking_number.as_deref(), Some("AWB-778"));

    // The owner can no longer cancel, and the failed attempt changes nothing.
    let err = orders.cancel(id, owner).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled
        }
    );
    assert_eq!(orders.require(id).await.unwrap().status, OrderStatus::Shipped);

    orders
        .transition(id, OrderStatus::Delivered, operator, None)
        .await
        .unwrap();
    let err = orders
        .transition(id, OrderStatus::Processing, operator, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    user_mock.verify();
    drop(orders);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_cancellation_rights() {
    let mut user_mock = MockClient::<User>::new();
    user_mock.expect_get(UserId(1)).return_ok(Some(customer(1)));
    user_mock.expect_get(UserId(1)).return_ok(Some(customer(1)));

    let (order_actor, order_resource) = order_actor::new();
    let orders = OrderClient::new(order_resource);
    let handle = tokio::spawn(order_actor.run(UserClient::new(user_mock.client())));

    let first = orders.create_order(order_for(UserId(1))).await.unwrap();
    let second = orders.create_order(order_for(UserId(1))).await.unwrap();

    // Another customer may not cancel someone else's order.
    let err = orders
        .cancel(first, Principal::customer(UserId(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Forbidden(_)));

    let cancelled = orders
        .cancel(first, Principal::customer(UserId(1)))
        .await
        .unwrap();
    assert_eq!(cancelled.order().status, OrderStatus::Cancelled);

    // Cancelling twice is a no-op.
    let again = orders
        .cancel(first, Principal::customer(UserId(1)))
        .await
        .unwrap();
    assert!(matches!(again, TransitionOutcome::Unchanged(_)));

    // Operators cancel confirmed orders through the regular transition.
    let operator = Principal::operator(UserId(100));
    orders
        .transition(second, OrderStatus::Confirmed, operator, None)
        .await
        .unwrap();
    let err = orders
        .cancel(second, Principal::customer(UserId(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
    let cancelled = orders
        .transition(second, OrderStatus::Cancelled, operator, None)
        .await
        .unwrap();
    assert_eq!(cancelled.order().status, OrderStatus::Cancelled);

    user_mock.verify();
    drop(orders);
    handle.await.unwrap();
}
