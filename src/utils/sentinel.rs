//! Completion markers. Each demo writes a small file whose content says it ran to the end.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    BasicTemplates,
    ChatTemplates,
    FewShotTemplates,
    AdvancedTemplates,
    FirstModel,
    MessagesDemo,
    ModelConfig,
    MultipleModels,
    SequentialChain,
    ParallelChains,
    DynamicRouting,
    AdvancedLcel,
    MemoryFundamentals,
    AdvancedMemory,
    DocumentLoader,
    VectorStore,
    RetrievalChain,
    ChatbotReady,
}

impl Milestone {
    pub const ALL: [Milestone; 18] = [
        Milestone::BasicTemplates,
        Milestone::ChatTemplates,
        Milestone::FewShotTemplates,
        Milestone::AdvancedTemplates,
        Milestone::FirstModel,
        Milestone::MessagesDemo,
        Milestone::ModelConfig,
        Milestone::MultipleModels,
        Milestone::SequentialChain,
        Milestone::ParallelChains,
        Milestone::DynamicRouting,
        Milestone::AdvancedLcel,
        Milestone::MemoryFundamentals,
        Milestone::AdvancedMemory,
        Milestone::DocumentLoader,
        Milestone::VectorStore,
        Milestone::RetrievalChain,
        Milestone::ChatbotReady,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Milestone::BasicTemplates => "basic-templates.txt",
            Milestone::ChatTemplates => "chat-templates.txt",
            Milestone::FewShotTemplates => "few-shot-templates.txt",
            Milestone::AdvancedTemplates => "advanced-templates.txt",
            Milestone::FirstModel => "first-model.txt",
            Milestone::MessagesDemo => "messages-demo.txt",
            Milestone::ModelConfig => "model-config.txt",
            Milestone::MultipleModels => "multiple-models.txt",
            Milestone::SequentialChain => "sequential-chain.txt",
            Milestone::ParallelChains => "parallel-chains.txt",
            Milestone::DynamicRouting => "dynamic-routing.txt",
            Milestone::AdvancedLcel => "advanced-lcel.txt",
            Milestone::MemoryFundamentals => "memory-fundamentals.txt",
            Milestone::AdvancedMemory => "advanced-memory.txt",
            Milestone::DocumentLoader => "document-loader.txt",
            Milestone::VectorStore => "vector-store.txt",
            Milestone::RetrievalChain => "retrieval-chain.txt",
            Milestone::ChatbotReady => "langchain-chatbot-ready.txt",
        }
    }

    pub fn content(&self) -> &'static str {
        match self {
            Milestone::BasicTemplates => "BASIC_TEMPLATES_COMPLETE",
            Milestone::ChatTemplates => "CHAT_TEMPLATES_COMPLETE",
            Milestone::FewShotTemplates => "FEW_SHOT_TEMPLATES_COMPLETE",
            Milestone::AdvancedTemplates => "ADVANCED_TEMPLATES_COMPLETE",
            Milestone::FirstModel => "FIRST_MODEL_COMPLETE",
            Milestone::MessagesDemo => "MESSAGES_DEMO_COMPLETE",
            Milestone::ModelConfig => "MODEL_CONFIG_COMPLETE",
            Milestone::MultipleModels => "MULTIPLE_MODELS_COMPLETE",
            Milestone::SequentialChain => "SEQUENTIAL_CHAIN_COMPLETE",
            Milestone::ParallelChains => "PARALLEL_CHAINS_COMPLETE",
            Milestone::DynamicRouting => "DYNAMIC_ROUTING_COMPLETE",
            Milestone::AdvancedLcel => "ADVANCED_LCEL_COMPLETE",
            Milestone::MemoryFundamentals => "MEMORY_FUNDAMENTALS_COMPLETE",
            Milestone::AdvancedMemory => "ADVANCED_MEMORY_COMPLETE",
            Milestone::DocumentLoader => "DOCUMENT_LOADER_COMPLETE",
            Milestone::VectorStore => "VECTOR_STORE_COMPLETE",
            Milestone::RetrievalChain => "RETRIEVAL_CHAIN_COMPLETE",
            Milestone::ChatbotReady => "LANGCHAIN_CHATBOT_READY",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content())
    }
}

/// Write the marker of `milestone` into `dir`, replacing any previous one. Returns the file path.
///
/// The content is written without a trailing newline.
pub fn write_sentinel(dir: impl AsRef<Path>, milestone: Milestone) -> io::Result<PathBuf> {
    let path = dir.as_ref().join(milestone.file_name());
    fs::write(&path, milestone.content())?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod test_sentinel {
    use std::collections::HashSet;
    use super::*;

    #[test]
    fn test_write_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sentinel(dir.path(), Milestone::BasicTemplates).unwrap();
        assert_eq!(dir.path().join("basic-templates.txt"), path);
        assert_eq!("BASIC_TEMPLATES_COMPLETE", fs::read_to_string(&path).unwrap());

        fs::write(&path, "stale content that is longer").unwrap();
        write_sentinel(dir.path(), Milestone::BasicTemplates).unwrap();
        assert_eq!("BASIC_TEMPLATES_COMPLETE", fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_sentinel(dir.path().join("missing"), Milestone::ChatbotReady).is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let files: HashSet<_> = Milestone::ALL.iter().map(Milestone::file_name).collect();
        let contents: HashSet<_> = Milestone::ALL.iter().map(Milestone::content).collect();
        assert_eq!(Milestone::ALL.len(), files.len());
        assert_eq!(Milestone::ALL.len(), contents.len());
        assert_eq!("LANGCHAIN_CHATBOT_READY", Milestone::ChatbotReady.to_string());
    }
}
