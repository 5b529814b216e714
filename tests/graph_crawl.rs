// tests/graph_crawl.rs
//! End-to-end crawl scenarios against an in-memory workspace.
//!
//! The mock implements the wire-level repository trait at single-page
//! granularity, so these tests exercise cursor handling, not-found
//! normalization, and the level-synchronous frontier exactly as a real
//! workspace would drive them.

use notion_graph::{
    AppError, Block, BlockType, Database, EdgeMultiplicity, GraphCrawler, GraphView, MentionKind,
    NodeLinks, NotionErrorCode, NotionId, NotionRepository, Page, PaginatedResponse, Parent,
    ParentRef, PropertyName, PropertyValue, ResourceKind, ResourceRef, ResourceRepository,
    RichTextItem,
};
use pretty_assertions::assert_eq;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// --- Fixture helpers ---

fn nid(n: u8) -> NotionId {
    NotionId::parse(&format!("{:032x}", n)).unwrap()
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

/// A page whose title lives in the usual "Name" title property.
fn page(id: &NotionId, title: &str, parent: ParentRef) -> Page {
    let mut properties = HashMap::new();
    if !title.is_empty() {
        properties.insert(
            PropertyName::new("Name"),
            PropertyValue::Title {
                fragments: vec![RichTextItem::plain_text(title)],
            },
        );
    }
    Page {
        id: id.clone(),
        created_time: now(),
        last_edited_time: now(),
        parent,
        properties,
    }
}

fn database(id: &NotionId, title: &str, parent: ParentRef) -> Database {
    Database {
        id: id.clone(),
        title: vec![RichTextItem::plain_text(title)],
        created_time: now(),
        last_edited_time: now(),
        parent,
    }
}

fn paragraph(mentions: Vec<MentionKind>) -> Block {
    Block {
        id: NotionId::new_v4(),
        block_type: BlockType::Paragraph,
        has_children: false,
        rich_text: mentions.into_iter().map(RichTextItem::mention).collect(),
    }
}

fn child_page_block(id: &NotionId) -> Block {
    Block {
        id: id.clone(),
        block_type: BlockType::ChildPage,
        has_children: true,
        rich_text: vec![],
    }
}

fn not_found(id: &NotionId) -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::ObjectNotFound,
        message: format!("Could not find object with ID: {}", id),
        status: reqwest::StatusCode::NOT_FOUND,
    }
}

fn auth_failure() -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::Unauthorized,
        message: "API token is invalid".to_string(),
        status: reqwest::StatusCode::UNAUTHORIZED,
    }
}

/// Slices `items` into cursor pages of `chunk` elements.
fn paginate<T: Clone>(items: &[T], chunk: usize, cursor: Option<String>) -> PaginatedResponse<T> {
    let start = cursor.as_deref().map_or(0, |c| c.parse::<usize>().unwrap());
    let end = (start + chunk).min(items.len());
    let has_more = end < items.len();
    PaginatedResponse {
        results: items[start..end].to_vec(),
        next_cursor: has_more.then(|| end.to_string()),
        has_more,
    }
}

// --- The in-memory workspace ---

#[derive(Default)]
struct MockWorkspace {
    seeds: Vec<ResourceRef>,
    pages: HashMap<NotionId, Page>,
    databases: HashMap<NotionId, Database>,
    children: HashMap<NotionId, Vec<Block>>,
    members: HashMap<NotionId, Vec<NotionId>>,
    /// Containers whose children listing 404s.
    vanished_containers: HashSet<NotionId>,
    /// Resources whose retrieval fails with a transport error.
    broken: HashSet<NotionId>,
    /// Overrides the requested page size when non-zero.
    chunk: usize,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl MockWorkspace {
    fn new() -> Self {
        Self::default()
    }

    fn seed_page(mut self, id: &NotionId) -> Self {
        self.seeds.push(ResourceRef::page(id.clone()));
        self
    }

    fn seed_database(mut self, id: &NotionId) -> Self {
        self.seeds.push(ResourceRef::database(id.clone()));
        self
    }

    fn with_page(mut self, page: Page, blocks: Vec<Block>) -> Self {
        self.children.insert(page.id.clone(), blocks);
        self.pages.insert(page.id.clone(), page);
        self
    }

    fn with_database(mut self, database: Database, members: Vec<NotionId>) -> Self {
        self.members.insert(database.id.clone(), members);
        self.databases.insert(database.id.clone(), database);
        self
    }

    fn with_block_children(mut self, container: &NotionId, blocks: Vec<Block>) -> Self {
        self.children.insert(container.clone(), blocks);
        self
    }

    fn with_vanished_container(mut self, container: &NotionId) -> Self {
        self.vanished_containers.insert(container.clone());
        self
    }

    fn with_broken(mut self, id: &NotionId) -> Self {
        self.broken.insert(id.clone());
        self
    }

    fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }

    fn record(&self, key: String) {
        *self.fetch_counts.lock().unwrap().entry(key).or_insert(0) += 1;
    }

    fn count(&self, key: &str) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn chunk_for(&self, page_size: u32) -> usize {
        if self.chunk > 0 {
            self.chunk
        } else {
            page_size as usize
        }
    }
}

#[async_trait::async_trait]
impl NotionRepository for MockWorkspace {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        self.record(format!("page:{}", id));
        if self.broken.contains(id) {
            return Err(auth_failure());
        }
        self.pages.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError> {
        self.record(format!("database:{}", id));
        if self.broken.contains(id) {
            return Err(auth_failure());
        }
        self.databases.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn retrieve_block_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        self.record(format!("children:{}", parent));
        if self.vanished_containers.contains(parent) {
            return Err(not_found(parent));
        }
        let blocks = self.children.get(parent).cloned().unwrap_or_default();
        Ok(paginate(&blocks, self.chunk_for(page_size), cursor))
    }

    async fn query_database(
        &self,
        database: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<NotionId>, AppError> {
        self.record(format!("query:{}", database));
        let members = self.members.get(database).cloned().unwrap_or_default();
        Ok(paginate(&members, self.chunk_for(page_size), cursor))
    }

    async fn search(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<ResourceRef>, AppError> {
        self.record("search".to_string());
        Ok(paginate(&self.seeds, self.chunk_for(page_size), cursor))
    }
}

fn crawler_over(mock: &Arc<MockWorkspace>) -> GraphCrawler {
    let repository = ResourceRepository::new(mock.clone(), 100, 4);
    GraphCrawler::new(repository)
}

fn page_links(node: &notion_graph::GraphNode) -> &notion_graph::LinkSet {
    match &node.links {
        NodeLinks::Page(links) => links,
        NodeLinks::Database(_) => panic!("expected a page node"),
    }
}

// --- Scenarios ---

#[tokio::test]
async fn crawls_child_and_mentioned_pages_end_to_end() {
    let (w, c, l) = (nid(1), nid(2), nid(3));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(
                page(&w, "Workspace Home", ParentRef::Workspace),
                vec![
                    child_page_block(&c),
                    paragraph(vec![MentionKind::Page { id: l.clone() }]),
                ],
            )
            .with_page(page(&c, "Child", ParentRef::Page { page_id: w.clone() }), vec![])
            .with_page(page(&l, "Linked", ParentRef::Page { page_id: w.clone() }), vec![]),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 3);

    let home = graph.get(&w).unwrap();
    assert_eq!(home.kind, ResourceKind::Page);
    assert_eq!(home.title, "Workspace Home");
    let links = page_links(home);
    assert_eq!(links.child_pages, vec![c.clone()]);
    assert_eq!(links.linked_pages, vec![l.clone()]);
    assert_eq!(links.parent, Parent::Workspace);

    assert_eq!(page_links(graph.get(&c).unwrap()).parent, Parent::Page(w.clone()));
    assert_eq!(page_links(graph.get(&l).unwrap()).parent, Parent::Page(w.clone()));
}

#[tokio::test]
async fn not_found_targets_are_pruned_but_edges_remain() {
    let (w, c, l) = (nid(1), nid(2), nid(3));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(
                page(&w, "Workspace Home", ParentRef::Workspace),
                vec![
                    child_page_block(&c),
                    paragraph(vec![MentionKind::Page { id: l.clone() }]),
                ],
            )
            .with_page(page(&c, "Child", ParentRef::Page { page_id: w.clone() }), vec![]),
        // l is never registered: fetching it returns not-found
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 2);
    assert!(graph.get(&l).is_none());

    // The dangling reference is still recorded on the source node
    let links = page_links(graph.get(&w).unwrap());
    assert_eq!(links.linked_pages, vec![l.clone()]);

    // ...and survives into the projected view as a dangling edge
    let view = GraphView::project(graph, EdgeMultiplicity::PerMention);
    assert!(view
        .links
        .iter()
        .any(|edge| edge.source == w && edge.target == l));
}

#[tokio::test]
async fn mention_cycles_terminate_with_one_fetch_per_id() {
    let (a, b) = (nid(1), nid(2));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&a)
            .with_page(
                page(&a, "A", ParentRef::Workspace),
                vec![paragraph(vec![MentionKind::Page { id: b.clone() }])],
            )
            .with_page(
                page(&b, "B", ParentRef::Workspace),
                vec![paragraph(vec![MentionKind::Page { id: a.clone() }])],
            ),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(mock.count(&format!("page:{}", a)), 1);
    assert_eq!(mock.count(&format!("page:{}", b)), 1);
}

#[tokio::test]
async fn child_page_subtrees_stay_out_of_the_parent_page() {
    let (w, c, l) = (nid(1), nid(2), nid(3));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(
                page(&w, "Parent", ParentRef::Workspace),
                vec![child_page_block(&c)],
            )
            .with_page(
                page(&c, "Nested", ParentRef::Page { page_id: w.clone() }),
                vec![paragraph(vec![MentionKind::Page { id: l.clone() }])],
            )
            .with_page(page(&l, "Deep", ParentRef::Page { page_id: c.clone() }), vec![]),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    // The parent's subtree holds only the child_page marker itself
    let parent_node = graph.get(&w).unwrap();
    assert_eq!(parent_node.blocks.len(), 1);
    assert_eq!(parent_node.blocks[0].block_type, BlockType::ChildPage);

    // The nested page's content was fetched exactly once: for its own node
    assert_eq!(mock.count(&format!("children:{}", c)), 1);
    let nested = graph.get(&c).unwrap();
    assert_eq!(page_links(nested).linked_pages, vec![l.clone()]);
    assert!(graph.get(&l).is_some());
}

#[tokio::test]
async fn database_members_become_page_nodes() {
    let (d, p) = (nid(4), nid(5));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_database(&d)
            .with_database(database(&d, "Tasks", ParentRef::Workspace), vec![p.clone()])
            .with_page(
                page(&p, "Task One", ParentRef::Database { database_id: d.clone() }),
                vec![],
            ),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 2);

    let tasks = graph.get(&d).unwrap();
    assert_eq!(tasks.kind, ResourceKind::Database);
    assert_eq!(tasks.title, "Tasks");
    assert!(tasks.blocks.is_empty());
    match &tasks.links {
        NodeLinks::Database(links) => {
            assert_eq!(links.pages, vec![p.clone()]);
            assert_eq!(links.parent, Parent::Workspace);
        }
        NodeLinks::Page(_) => panic!("expected a database node"),
    }

    let member = graph.get(&p).unwrap();
    assert_eq!(page_links(member).parent, Parent::Database(d.clone()));
}

#[tokio::test]
async fn non_workspace_parents_are_crawled_too() {
    let (p, q) = (nid(1), nid(2));
    // q is only reachable through p's parent declaration
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&p)
            .with_page(page(&p, "Leaf", ParentRef::Page { page_id: q.clone() }), vec![])
            .with_page(page(&q, "Ancestor", ParentRef::Workspace), vec![]),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.get(&q).unwrap().title, "Ancestor");
}

#[tokio::test]
async fn shared_targets_are_fetched_once_across_link_categories() {
    let (w, p) = (nid(1), nid(2));
    // p is both a structural child and an inline mention of w
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(
                page(&w, "Both", ParentRef::Workspace),
                vec![
                    child_page_block(&p),
                    paragraph(vec![MentionKind::Page { id: p.clone() }]),
                ],
            )
            .with_page(page(&p, "Target", ParentRef::Page { page_id: w.clone() }), vec![]),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(mock.count(&format!("page:{}", p)), 1);

    // Both references are preserved on the source side
    let links = page_links(graph.get(&w).unwrap());
    assert_eq!(links.child_pages, vec![p.clone()]);
    assert_eq!(links.linked_pages, vec![p.clone()]);
}

#[tokio::test]
async fn user_mentions_are_recorded_but_never_crawled() {
    let (w, u) = (nid(1), nid(9));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(
                page(&w, "Team notes", ParentRef::Workspace),
                vec![paragraph(vec![MentionKind::User { id: u.clone() }])],
            ),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(page_links(graph.get(&w).unwrap()).linked_users, vec![u.clone()]);
    assert_eq!(mock.count(&format!("page:{}", u)), 0);
}

#[tokio::test]
async fn title_fallback_uses_name_then_title_then_empty() {
    let (a, b, c) = (nid(1), nid(2), nid(3));

    let mut titled_via_title = page(&b, "", ParentRef::Workspace);
    titled_via_title.properties.insert(
        PropertyName::new("title"),
        PropertyValue::Title {
            fragments: vec![
                RichTextItem::plain_text(" Untitled "),
                RichTextItem::plain_text("Draft "),
            ],
        },
    );

    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&a)
            .seed_page(&b)
            .seed_page(&c)
            .with_page(page(&a, "Named", ParentRef::Workspace), vec![])
            .with_page(titled_via_title, vec![])
            .with_page(page(&c, "", ParentRef::Workspace), vec![]),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.get(&a).unwrap().title, "Named");
    assert_eq!(graph.get(&b).unwrap().title, "Untitled Draft");
    assert_eq!(graph.get(&c).unwrap().title, "");
}

#[tokio::test]
async fn block_pagination_is_drained_in_order() {
    let w = nid(1);
    let blocks: Vec<Block> = (0..7)
        .map(|_| paragraph(vec![]))
        .collect();
    let expected_ids: Vec<NotionId> = blocks.iter().map(|b| b.id.clone()).collect();

    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(page(&w, "Long", ParentRef::Workspace), blocks)
            .with_chunk(3),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    let node = graph.get(&w).unwrap();
    let drained_ids: Vec<NotionId> = node.blocks.iter().map(|b| b.id.clone()).collect();
    assert_eq!(drained_ids, expected_ids);

    // 7 blocks at 3 per page = 3 cursor pages
    assert_eq!(mock.count(&format!("children:{}", w)), 3);
}

#[tokio::test]
async fn search_pagination_is_drained() {
    let ids: Vec<NotionId> = (1..=5).map(nid).collect();
    let mut mock = MockWorkspace::new().with_chunk(2);
    for id in &ids {
        mock = mock
            .seed_page(id)
            .with_page(page(id, "Seeded", ParentRef::Workspace), vec![]);
    }
    let mock = Arc::new(mock);

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert_eq!(graph.len(), 5);
    assert_eq!(mock.count("search"), 3);
}

#[tokio::test]
async fn vanished_container_yields_an_empty_subtree() {
    let w = nid(1);
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .with_page(page(&w, "Flaky", ParentRef::Workspace), vec![])
            .with_vanished_container(&w),
    );

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    let node = graph.get(&w).unwrap();
    assert!(node.blocks.is_empty());
    assert_eq!(page_links(node).child_pages, Vec::<NotionId>::new());
}

#[tokio::test]
async fn transport_failure_aborts_the_whole_crawl() {
    let (w, b) = (nid(1), nid(2));
    let mock = Arc::new(
        MockWorkspace::new()
            .seed_page(&w)
            .seed_page(&b)
            .with_page(page(&w, "Fine", ParentRef::Workspace), vec![])
            .with_broken(&b),
    );

    let mut crawler = crawler_over(&mock);
    let result = crawler.build().await;

    assert!(matches!(
        result,
        Err(AppError::NotionService {
            code: NotionErrorCode::Unauthorized,
            ..
        })
    ));
    // No partial graph is installed on failure
    assert!(crawler.graph().is_none());
}

#[tokio::test]
async fn empty_workspace_produces_an_empty_graph() {
    let mock = Arc::new(MockWorkspace::new());

    let mut crawler = crawler_over(&mock);
    let graph = crawler.build().await.unwrap();

    assert!(graph.is_empty());
    assert_eq!(mock.count("search"), 1);
}
