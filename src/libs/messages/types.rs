#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigModuleOpenProject,
    ConfigModuleTmetric,
    ConfigSaved(String), // path
    ConfigFileLoaded(String),

    // === USER MESSAGES ===
    UsingTmetricUser(String),
    UsingOpenProjectUser(String),

    // === CHECK MESSAGES ===
    EntriesWithoutWorkType(usize),
    EntriesWithoutLink(usize),
    NoWorkTypesAvailable(String), // project
    WorkTypeAssigned(String, String), // note, work type
    WorkPackageNotFound(u64, String), // id, error
    UpdatingEntry(String),
    WorkPackageLinked(String, u64),
    EntrySkipped(String),
    TmetricDataValid,
    CheckFinished(usize, usize, usize), // work types, links, skipped

    // === COPY MESSAGES ===
    CopyMissingWorkType,
    CopyMissingLink,
    NothingToCopy,
    CopyingEntries(usize),
    EntryTransferred(String),
    EntriesCopied(usize),
    AlreadyTransferred(usize),

    // === DIFF MESSAGES ===
    DiffHeader(String), // range

    // === TEMPLATE MESSAGES ===
    TemplateReadFailed(String),

    // === PROMPTS ===
    PromptOpenProjectUrl,
    PromptOpenProjectToken,
    PromptTmetricToken,
    PromptTmetricClientId,
    PromptTmetricDummyProjectId,
    PromptSelectWorkType(String),
    PromptWorkPackageId(String),
    ConfirmWorkPackage(u64, String),
}
