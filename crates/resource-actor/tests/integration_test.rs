use async_trait::async_trait;
use resource_actor::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Perfume {
    id: u32,
    name: String,
    stock: u32,
}

#[derive(Debug)]
struct PerfumeCreate {
    name: String,
    stock: u32,
}

#[derive(Debug)]
struct PerfumeUpdate {
    name: Option<String>,
}

#[derive(Debug)]
enum PerfumeAction {
    Reserve(u32),
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum PerfumeError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("only {available} left")]
    Insufficient { available: u32 },
    #[error("{0}")]
    Framework(String),
}

#[async_trait]
impl ActorEntity for Perfume {
    type Id = u32;
    type Create = PerfumeCreate;
    type Update = PerfumeUpdate;
    type Action = PerfumeAction;
    type ActionResult = u32;
    type Context = ();
    type Error = PerfumeError;

    fn from_create_params(id: u32, params: PerfumeCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(PerfumeError::EmptyName);
        }
        Ok(Self {
            id,
            name: params.name,
            stock: params.stock,
        })
    }

    async fn on_update(&mut self, update: PerfumeUpdate, _: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = name;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: PerfumeAction, _: &()) -> Result<u32, Self::Error> {
        match action {
            PerfumeAction::Reserve(quantity) => {
                // Mutate first, then fail: the actor must discard the draft.
                let available = self.stock;
                self.stock = self.stock.saturating_sub(quantity);
                if quantity > available {
                    return Err(PerfumeError::Insufficient { available });
                }
                Ok(self.stock)
            }
        }
    }
}

struct PerfumeClient {
    inner: ResourceClient<Perfume>,
}

impl ActorClient<Perfume> for PerfumeClient {
    type Error = PerfumeError;

    fn inner(&self) -> &ResourceClient<Perfume> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> PerfumeError {
        e.downcast_entity::<PerfumeError>()
            .unwrap_or_else(|other| PerfumeError::Framework(other.to_string()))
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));

    let id: u32 = client
        .create(PerfumeCreate {
            name: "Vetiver".into(),
            stock: 5,
        })
        .await
        .unwrap();
    assert_eq!(id, 1);

    let left = client
        .perform_action(id, PerfumeAction::Reserve(2))
        .await
        .unwrap();
    assert_eq!(left, 3);

    let updated: Perfume = client
        .update(
            id,
            PerfumeUpdate {
                name: Some("Vetiver Intense".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Vetiver Intense");
    assert_eq!(updated.stock, 3);

    let second = client
        .create(PerfumeCreate {
            name: "Oud".into(),
            stock: 1,
        })
        .await
        .unwrap();
    assert_eq!(second, 2);
}

#[tokio::test]
async fn failed_action_leaves_entity_unchanged() {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));

    let id = client
        .create(PerfumeCreate {
            name: "Iris".into(),
            stock: 1,
        })
        .await
        .unwrap();

    let err = client
        .perform_action(id, PerfumeAction::Reserve(4))
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_entity::<PerfumeError>().unwrap(),
        PerfumeError::Insufficient { available: 1 }
    );

    let stored: Perfume = client.get(id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 1);
}

#[tokio::test]
async fn typed_client_maps_errors() {
    let (actor, inner) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));
    let client = PerfumeClient { inner };

    let err = client
        .inner()
        .create(PerfumeCreate {
            name: "  ".into(),
            stock: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(PerfumeClient::map_error(err), PerfumeError::EmptyName);

    assert_eq!(client.get(42).await.unwrap(), None);
    assert!(matches!(
        client.require(42).await,
        Err(PerfumeError::Framework(msg)) if msg.contains("42")
    ));
}

#[tokio::test]
async fn closed_actor_is_reported() {
    let (actor, client) = ResourceActor::<Perfume>::new(1);
    drop(actor);

    let err = client.get(1).await.unwrap_err();
    assert!(err.is_unavailable());
}
