pub mod documents;
pub use documents::{Collection, DocumentStore, Filter, SharedDocumentStore, StoredDocument};
pub mod memory_store;
pub use memory_store::MemoryDocumentStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;

pub mod associate_repo;
pub use associate_repo::AssociateRepository;
pub mod corporation_repo;
pub use corporation_repo::CorporationRepository;
pub mod tip_repo;
pub use tip_repo::TipRepository;
pub mod message_repo;
pub use message_repo::MessageRepository;
pub mod join_request_repo;
pub use join_request_repo::JoinRequestRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

// Todos os repositórios montados sobre o mesmo document store
#[derive(Clone)]
pub struct Repositories {
    pub store: SharedDocumentStore,
    pub associates: AssociateRepository,
    pub corporations: CorporationRepository,
    pub tips: TipRepository,
    pub messages: MessageRepository,
    pub join_requests: JoinRequestRepository,
    pub users: UserRepository,
}

impl Repositories {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            associates: AssociateRepository::new(store.clone()),
            corporations: CorporationRepository::new(store.clone()),
            tips: TipRepository::new(store.clone()),
            messages: MessageRepository::new(store.clone()),
            join_requests: JoinRequestRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            store,
        }
    }
}
