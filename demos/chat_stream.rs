use std::io::stdout;
use std::process::exit;

use futures::StreamExt;
use termimad::crossterm::{cursor, ExecutableCommand};

use promptkit::conversation::Message;
use promptkit::utils::llm::openai::{ChatClient, ChatConfig};
use promptkit::utils::printing::IncrementalMarkdownPrinter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        // to avoid a missing cursor when Ctrl-C is pressed mid-stream
        stdout().execute(cursor::Show).unwrap();
        exit(0);
    })
    .expect("Error setting Ctrl-C handler");

    let client = ChatClient::new(ChatConfig::new("gpt-3.5-turbo").with_temperature(0.2));
    let messages = vec![
        Message::system("You are a concise assistant. Answer in markdown."),
        Message::user("Explain what perplexity measures, in three bullet points."),
    ];

    let mut stream = client.complete_streaming(&messages).await?;
    let mut printer = IncrementalMarkdownPrinter::default();
    printer.activate(true);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(delta) = chunk.choices.first().and_then(|choice| choice.delta.content.as_ref()) {
            printer.push_and_print(delta);
        }
    }
    printer.deactivate();
    println!();
    Ok(())
}
