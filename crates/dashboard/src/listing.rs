//! Filtering and pagination for the admin tables
//!
//! Pure helpers over already-fetched lists; nothing here does I/O.

use panel_core::{Node, SupportTicket, TicketPriority, TicketStatus};

/// Rows per page on the support desk
pub const TICKETS_PER_PAGE: usize = 12;

/// Rows per page on the node list
pub const NODES_PER_PAGE: usize = 10;

/// One page of a longer list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Cut page `page` (1-based) out of `items`
///
/// Page 0 is read as page 1. A page past the end comes back empty but
/// still reports the real totals.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Support desk filters; `None` means "all"
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Matched against subject and author, case-insensitive
    pub search: String,
    pub priority: Option<TicketPriority>,
    pub category: Option<String>,
    pub status: Option<TicketStatus>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || ticket.subject.to_lowercase().contains(&search)
            || ticket.user.username.to_lowercase().contains(&search);

        matches_search
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self
                .category
                .as_deref()
                .map_or(true, |c| ticket.category == c)
            && self.status.map_or(true, |s| ticket.status == s)
    }

    pub fn apply(&self, tickets: Vec<SupportTicket>) -> Vec<SupportTicket> {
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Keep nodes whose name or FQDN contains `search`, case-insensitive
pub fn filter_nodes(nodes: Vec<Node>, search: &str) -> Vec<Node> {
    let search = search.to_lowercase();
    if search.is_empty() {
        return nodes;
    }
    nodes
        .into_iter()
        .filter(|n| {
            n.name.to_lowercase().contains(&search) || n.fqdn.to_lowercase().contains(&search)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::TicketUser;

    fn ticket(id: u32, subject: &str, user: &str, priority: TicketPriority) -> SupportTicket {
        SupportTicket {
            id: id.to_string(),
            subject: subject.to_string(),
            category: if id % 2 == 0 { "billing" } else { "technical" }.to_string(),
            priority,
            status: if id % 3 == 0 {
                TicketStatus::Closed
            } else {
                TicketStatus::Open
            },
            user: TicketUser {
                username: user.to_string(),
                email: String::new(),
            },
            messages: Vec::new(),
        }
    }

    fn node(name: &str, fqdn: &str) -> Node {
        Node {
            id: name.to_string(),
            name: name.to_string(),
            fqdn: fqdn.to_string(),
            memory: 0,
            disk: 0,
            status: None,
            location: None,
        }
    }

    #[test]
    fn test_paginate_empty_list() {
        let page = paginate(Vec::<u32>::new(), 1, TICKETS_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, 3, TICKETS_PER_PAGE);
        assert_eq!(page.items, vec![25]);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_paginate_full_middle_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, 2, NODES_PER_PAGE);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert!(page.has_next());
    }

    #[test]
    fn test_paginate_past_the_end() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(items, 4, NODES_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 4);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_paginate_page_zero_is_first_page() {
        let page = paginate(vec!['a', 'b', 'c'], 0, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec!['a', 'b']);
    }

    #[test]
    fn test_ticket_search_matches_subject_or_author() {
        let tickets = vec![
            ticket(1, "Server won't start", "alice", TicketPriority::High),
            ticket(2, "Refund", "bob", TicketPriority::Low),
            ticket(3, "Lag spikes", "carol", TicketPriority::Urgent),
        ];

        let by_subject = TicketFilter {
            search: "SERVER".to_string(),
            ..TicketFilter::default()
        };
        assert_eq!(by_subject.apply(tickets.clone()).len(), 1);

        let by_author = TicketFilter {
            search: "bo".to_string(),
            ..TicketFilter::default()
        };
        assert_eq!(by_author.apply(tickets.clone())[0].id, "2");

        assert_eq!(TicketFilter::default().apply(tickets).len(), 3);
    }

    #[test]
    fn test_ticket_filters_combine() {
        let tickets = vec![
            ticket(1, "a", "alice", TicketPriority::High),
            ticket(2, "b", "bob", TicketPriority::High),
            ticket(3, "c", "carol", TicketPriority::High),
            ticket(4, "d", "dave", TicketPriority::Low),
        ];

        let filter = TicketFilter {
            priority: Some(TicketPriority::High),
            category: Some("technical".to_string()),
            status: Some(TicketStatus::Open),
            ..TicketFilter::default()
        };
        let ids: Vec<_> = filter.apply(tickets).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_filter_nodes_by_name_or_fqdn() {
        let nodes = vec![
            node("eu-1", "fra.example.net"),
            node("us-1", "nyc.example.net"),
        ];
        assert_eq!(filter_nodes(nodes.clone(), "NYC")[0].name, "us-1");
        assert_eq!(filter_nodes(nodes.clone(), "eu")[0].name, "eu-1");
        assert_eq!(filter_nodes(nodes.clone(), "").len(), 2);
        assert!(filter_nodes(nodes, "asia").is_empty());
    }
}
