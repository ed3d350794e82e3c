use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::{env, process};

use anyhow::Result;
use regex::Regex;
use verseblock_engine::{
    BlockId, BlockStateMachine, BlockStatus, ChannelError, ContinuationError, CursorContinuation,
    LookupPayload, LookupRequest, LookupResult, LookupSession, OutboundSink, RawText, VersePair,
    attrs, codec, trigger,
};

/// Canned Genesis 1 passage (KJV, public domain) served by the scripted host
const GENESIS_1: &[(u32, &str)] = &[
    (1, "In the beginning God created the heaven and the earth."),
    (
        2,
        "And the earth was without form, and void; and darkness was upon the face of the deep.",
    ),
    (3, "And God said, Let there be light: and there was light."),
];

/// Sink shared with the scripted host so it can see what the block sent
#[derive(Clone, Default)]
struct CapturedOutbox(Rc<RefCell<Vec<LookupRequest>>>);

impl OutboundSink for CapturedOutbox {
    fn send(&mut self, request: &LookupRequest) -> Result<(), ChannelError> {
        log::debug!("outbound: {}", serde_json::to_string(request)?);
        self.0.borrow_mut().push(request.clone());
        Ok(())
    }
}

struct PrintedCursor;

impl CursorContinuation for PrintedCursor {
    fn continue_after(&mut self, block: &BlockId) -> Result<(), ContinuationError> {
        println!("cursor advanced past block {block}");
        Ok(())
    }
}

fn query_regex() -> &'static Regex {
    static QUERY_REGEX: OnceLock<Regex> = OnceLock::new();
    QUERY_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(genesis|gen|01)\s+(\d+):(\d+)(?:-(\d+))?\s*$")
            .expect("Invalid query regex")
    })
}

/// Scripted stand-in for the external lookup host: answers Genesis 1 queries
/// from the canned passage, everything else with a failure result
fn resolve(request: &LookupRequest) -> LookupResult {
    let Some(captures) = query_regex().captures(&request.query) else {
        return LookupResult::failure(request.id.clone());
    };
    let chapter: u32 = captures[2].parse().unwrap_or(0);
    let start: u32 = captures[3].parse().unwrap_or(0);
    let end: u32 = captures
        .get(4)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(start);

    let verses: Vec<_> = GENESIS_1
        .iter()
        .filter(|(verse, _)| *verse >= start && *verse <= end)
        .map(|(verse, text)| VersePair::new(*verse, *text))
        .collect();
    if chapter != 1 || verses.is_empty() {
        return LookupResult::failure(request.id.clone());
    }

    LookupResult {
        id: request.id.clone(),
        result: Some(LookupPayload {
            book: Some("01".to_string()),
            chapter: Some(chapter),
            start: Some(start),
            end: Some(end),
            text: Some(RawText::Single(
                verses
                    .iter()
                    .map(|pair| pair.text.clone())
                    .collect::<Vec<_>>()
                    .join("\n"),
            )),
            verses: Some(verses),
            ..Default::default()
        }),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <query>", args[0]);
        eprintln!("  e.g. {} \"genesis 1:1-3\"", args[0]);
        eprintln!("  or   {} \"/bible genesis 1:1-3\"", args[0]);
        process::exit(1);
    }
    // Accept either the raw query or a full trigger line
    let query = trigger::match_trigger(&args[1]).unwrap_or(args[1].trim());

    let outbox = CapturedOutbox::default();
    let mut session = LookupSession::new(outbox.clone());
    session.set_continuation(Box::new(PrintedCursor));

    let id = session.insert(BlockStateMachine::new());
    println!("block {id}: {}", BlockStatus::Input);

    session.submit(&id, query);
    println!("block {id}: {} (query \"{query}\")", BlockStatus::Loading);

    // The real host lives in another process; here the scripted resolver
    // answers the captured request and we feed the broadcast back in
    let requests = outbox.0.borrow().clone();
    for request in &requests {
        let broadcast = resolve(request);
        session.on_result(&broadcast);
    }

    let block = session
        .block(&id)
        .ok_or_else(|| anyhow::anyhow!("block {id} disappeared from the session"))?;
    println!("block {id}: {}", block.status);

    match block.status {
        BlockStatus::Resolved => {
            let book_name = block.display_book_name();
            let chapter = block.chapter.unwrap_or(1);
            for pair in codec::project_display_pairs(block) {
                println!("  {book_name} {chapter}:{}  {}", pair.verse, pair.text);
            }
            println!("element: {}", attrs::to_element(block));
            Ok(())
        }
        _ => {
            eprintln!("lookup failed for \"{query}\"");
            process::exit(2);
        }
    }
}
