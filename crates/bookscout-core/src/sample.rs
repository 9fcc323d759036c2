//! Built-in sample catalog served when the remote catalog is unreachable.

use crate::models::{Book, SearchPage, is_wildcard};

struct SampleRecord {
    key: &'static str,
    title: &'static str,
    author: &'static str,
    year: i32,
    cover_id: i64,
    editions: u32,
    pages: u32,
    publisher: &'static str,
}

const SAMPLE: [SampleRecord; 8] = [
    SampleRecord {
        key: "/works/OL27448W",
        title: "O Senhor dos Anéis",
        author: "J.R.R. Tolkien",
        year: 1954,
        cover_id: 14625765,
        editions: 120,
        pages: 1216,
        publisher: "Allen & Unwin",
    },
    SampleRecord {
        key: "/works/OL47804W",
        title: "1984",
        author: "George Orwell",
        year: 1949,
        cover_id: 9267242,
        editions: 85,
        pages: 328,
        publisher: "Secker & Warburg",
    },
    SampleRecord {
        key: "/works/OL45804W",
        title: "O Pequeno Príncipe",
        author: "Antoine de Saint-Exupéry",
        year: 1943,
        cover_id: 8570014,
        editions: 95,
        pages: 96,
        publisher: "Reynal & Hitchcock",
    },
    SampleRecord {
        key: "/works/OL12345W",
        title: "Dom Casmurro",
        author: "Machado de Assis",
        year: 1899,
        cover_id: 647501,
        editions: 45,
        pages: 256,
        publisher: "Livraria Garnier",
    },
    SampleRecord {
        key: "/works/OL67890W",
        title: "Grande Sertão: Veredas",
        author: "João Guimarães Rosa",
        year: 1956,
        cover_id: 13946180,
        editions: 32,
        pages: 624,
        publisher: "José Olympio",
    },
    SampleRecord {
        key: "/works/OL34567W",
        title: "Capitães da Areia",
        author: "Jorge Amado",
        year: 1937,
        cover_id: 4178919,
        editions: 67,
        pages: 288,
        publisher: "José Olympio",
    },
    SampleRecord {
        key: "/works/OL90123W",
        title: "Vidas Secas",
        author: "Graciliano Ramos",
        year: 1938,
        cover_id: 12369687,
        editions: 28,
        pages: 176,
        publisher: "José Olympio",
    },
    SampleRecord {
        key: "/works/OL56789W",
        title: "Macunaíma",
        author: "Mário de Andrade",
        year: 1928,
        cover_id: 6921967,
        editions: 41,
        pages: 208,
        publisher: "Livraria Martins",
    },
];

/// Number of records in the sample catalog.
pub const SAMPLE_SIZE: usize = SAMPLE.len();

/// The full sample catalog, in fixed order.
pub fn sample_books() -> Vec<Book> {
    SAMPLE
        .iter()
        .map(|r| Book {
            key: r.key.to_string(),
            title: r.title.to_string(),
            authors: vec![r.author.to_string()],
            first_publish_year: Some(r.year),
            cover_id: Some(r.cover_id),
            median_pages: Some(r.pages),
            publishers: vec![r.publisher.to_string()],
            edition_count: r.editions,
            subjects: Vec::new(),
            languages: Vec::new(),
        })
        .collect()
}

/// Sample records matching `query`, as a single unpaginated page.
///
/// Wildcard or blank queries return the whole catalog; anything else is a
/// case-insensitive substring match on title or author.
pub fn sample_page(query: &str) -> SearchPage {
    let books = sample_books();
    if is_wildcard(query) {
        return SearchPage::whole(books);
    }
    let needle = query.trim().to_lowercase();
    SearchPage::whole(
        books
            .into_iter()
            .filter(|b| b.matches_lowercase(&needle))
            .collect(),
    )
}
