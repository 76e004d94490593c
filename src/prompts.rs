//! Stage system instructions
//!
//! Each stage gets a fixed instruction prepended to the transcript. The query
//! stage's instruction embeds a description of the external search API's URL
//! grammar, which can be replaced at startup from a file.

use std::path::Path;

const QUERY_BASE: &str = "You are an arxiv assistant. Use the api details below to fetch information necessary for answering the user's prompt.

Reply only with the request URLs you need, one per line, with no other text. Reply with nothing if no search is needed.
";

/// arXiv export API reference used when no override file is configured
pub const DEFAULT_SEARCH_API_REFERENCE: &str = r"
The arXiv API is queried with HTTP GET requests of the form:

    http://export.arxiv.org/api/query?{parameters}

Parameters:
- search_query: a query built from field prefixes joined with AND, OR, ANDNOT
  - ti: title, au: author, abs: abstract, co: comment, jr: journal reference,
    cat: subject category, rn: report number, id: arXiv id, all: all fields
  - spaces are written as '+', phrases are grouped with %22 quotes and
    parentheses are written as %28 and %29
- id_list: comma-separated arXiv ids, e.g. id_list=1706.03762,2005.14165
- start: index of the first result (default 0)
- max_results: number of results (default 10, keep it small)
- sortBy: relevance, lastUpdatedDate or submittedDate
- sortOrder: ascending or descending

Examples:
    http://export.arxiv.org/api/query?search_query=ti:attention+AND+ti:need&max_results=5
    http://export.arxiv.org/api/query?search_query=au:hinton+AND+cat:cs.LG&sortBy=submittedDate&sortOrder=descending&max_results=5
    http://export.arxiv.org/api/query?id_list=1706.03762

The response is an Atom feed; each entry carries the title, authors, abstract
and links to the abstract page and the PDF.
";

const LINK_PROMPT: &str = "You are an arxiv assistant. Decide whether answering the user's latest message requires reading the full text of one specific paper, beyond the search results already provided.

If it does, reply with exactly one link to that paper's PDF (for arXiv papers use https://arxiv.org/pdf/<id>) and nothing else.
If it does not, reply with exactly: None";

/// Instructions for the three stages
#[derive(Debug, Clone)]
pub struct Prompts {
    pub query: String,
    pub link: String,
    pub answer: String,
}

impl Prompts {
    pub fn new(search_reference: &str, max_message_characters: usize) -> Self {
        Self {
            query: format!("{QUERY_BASE}{search_reference}"),
            link: LINK_PROMPT.to_string(),
            answer: format!(
                "You are an arxiv assistant. Please answer the user's question or complete the specified task. Ensure your response is less than {max_message_characters} characters"
            ),
        }
    }
}

/// Load the search API reference from `path`, or the built-in one
pub fn load_search_reference(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => Ok(DEFAULT_SEARCH_API_REFERENCE.to_string()),
    }
}

/// Appended after search results: points the next stage back at the question
pub fn search_directive(question: &str) -> String {
    format!("Use the information above to answer the following question: {question}")
}

/// Appended after a converted paper
pub fn paper_directive(question: &str) -> String {
    format!(
        "Use the full paper above, rather than the search results, to answer the following question: {question}"
    )
}
