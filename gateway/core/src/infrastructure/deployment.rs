// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deployment Declarations
//!
//! Stage-aware naming plus a CloudFormation template for hosting the relay:
//! log group, execution role, ARM64 function behind the Lambda web adapter,
//! and a regional REST API proxying every path in streaming mode.
//!
//! The agent runtime itself is provisioned elsewhere. Its ARN comes in as the
//! `AgentRuntimeArn` template parameter and is stored in the parameter store
//! entry the relay reads at request time.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Infrastructure-as-code for the relay

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const PROJECT_NAME_LONG: &str = "agent-core-playground";
pub const PROJECT_NAME_SHORT: &str = "acp";
pub const DEFAULT_DEPLOY_REGION: &str = "ap-northeast-1";

/// Publisher account of the Lambda web adapter layer
const WEB_ADAPTER_ACCOUNT: &str = "753240598075";
const WEB_ADAPTER_LAYER: &str = "LambdaAdapterLayerArm64:25";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Dev,
    Prd,
}

impl StageName {
    pub const ALL: [StageName; 2] = [StageName::Dev, StageName::Prd];

    pub fn long(&self) -> &'static str {
        match self {
            StageName::Dev => "dev",
            StageName::Prd => "prd",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            StageName::Dev => "d",
            StageName::Prd => "p",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeploymentError {
    #[error("Invalid stage name: {0}. Must be one of: dev, prd")]
    InvalidStage(String),

    #[error("CDK_DEFAULT_ACCOUNT is not set")]
    MissingAccount,
}

impl FromStr for StageName {
    type Err = DeploymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageName::ALL
            .into_iter()
            .find(|stage| stage.long() == s)
            .ok_or_else(|| DeploymentError::InvalidStage(s.to_string()))
    }
}

/// Resolved names for one stage deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub stage: StageName,
    pub account: String,
    pub region: String,
}

impl DeploymentConfig {
    pub fn for_stage(stage: StageName, account: Option<String>) -> Result<Self, DeploymentError> {
        let account = account
            .filter(|a| !a.trim().is_empty())
            .ok_or(DeploymentError::MissingAccount)?;
        Ok(Self {
            stage,
            account,
            region: DEFAULT_DEPLOY_REGION.to_string(),
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// `/{stage}/{project}` prefix for every parameter of this deployment
    pub fn ssm_prefix(&self) -> String {
        format!("/{}/{}", self.stage.long(), PROJECT_NAME_LONG)
    }

    pub fn runtime_arn_param(&self) -> String {
        format!("{}/agent-core/runtime-arn", self.ssm_prefix())
    }

    /// `{stage_short}-{project_short}`, prefix of physical resource names
    pub fn physical_prefix(&self) -> String {
        format!("{}-{}", self.stage.short(), PROJECT_NAME_SHORT)
    }

    pub fn stack_name(&self) -> String {
        format!("{}-main", self.physical_prefix())
    }

    pub fn function_name(&self) -> String {
        format!("{}-web", self.physical_prefix())
    }
}

/// Render the CloudFormation template for the web tier of one stage.
pub fn render_template(config: &DeploymentConfig) -> Value {
    let function_name = config.function_name();
    let param_arn = format!(
        "arn:aws:ssm:{}:{}:parameter{}",
        config.region,
        config.account,
        config.runtime_arn_param()
    );
    let adapter_layer = format!(
        "arn:aws:lambda:{}:{}:layer:{}",
        config.region, WEB_ADAPTER_ACCOUNT, WEB_ADAPTER_LAYER
    );
    let streaming_uri = json!({
        "Fn::Sub": "arn:aws:apigateway:${AWS::Region}:lambda:path/2021-11-15/functions/${Function.Arn}/response-streaming-invocations"
    });
    let proxy_integration = json!({
        "Type": "AWS_PROXY",
        "IntegrationHttpMethod": "POST",
        "Uri": streaming_uri,
        "ResponseTransferMode": "STREAM",
        "TimeoutInMillis": 900_000
    });

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!("{} web relay ({})", PROJECT_NAME_LONG, config.stage),
        "Parameters": {
            "AgentRuntimeArn": {
                "Type": "String",
                "Description": "ARN of the AgentCore Runtime the relay invokes"
            }
        },
        "Resources": {
            "RuntimeArnParameter": {
                "Type": "AWS::SSM::Parameter",
                "Properties": {
                    "Name": config.runtime_arn_param(),
                    "Type": "String",
                    "Value": { "Ref": "AgentRuntimeArn" },
                    "Description": "AgentCore Runtime ARN"
                }
            },
            "LogGroup": {
                "Type": "AWS::Logs::LogGroup",
                "DeletionPolicy": "Delete",
                "Properties": {
                    "LogGroupName": format!("/aws/lambda/{}", function_name),
                    "RetentionInDays": 7
                }
            },
            "LambdaRole": {
                "Type": "AWS::IAM::Role",
                "Properties": {
                    "AssumeRolePolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": { "Service": "lambda.amazonaws.com" },
                            "Action": "sts:AssumeRole"
                        }]
                    },
                    "ManagedPolicyArns": [
                        "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
                    ],
                    "Policies": [{
                        "PolicyName": "relay-access",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [
                                {
                                    "Effect": "Allow",
                                    "Action": ["ssm:GetParameter"],
                                    "Resource": [param_arn]
                                },
                                {
                                    "Effect": "Allow",
                                    "Action": ["bedrock-agentcore:InvokeAgentRuntime"],
                                    "Resource": ["*"]
                                }
                            ]
                        }
                    }]
                }
            },
            "Function": {
                "Type": "AWS::Lambda::Function",
                "DependsOn": ["LogGroup"],
                "Properties": {
                    "FunctionName": function_name,
                    "Runtime": "provided.al2023",
                    "Architectures": ["arm64"],
                    "Handler": "bootstrap",
                    "MemorySize": 256,
                    "Timeout": 900,
                    "Role": { "Fn::GetAtt": ["LambdaRole", "Arn"] },
                    "Layers": [adapter_layer],
                    "LoggingConfig": { "LogGroup": { "Ref": "LogGroup" } },
                    "Environment": {
                        "Variables": {
                            "AWS_LAMBDA_EXEC_WRAPPER": "/opt/bootstrap",
                            "AWS_LWA_INVOKE_MODE": "response_stream",
                            "PORT": "3000",
                            "AGENT_RUNTIME_ARN_SSM_PARAM": config.runtime_arn_param()
                        }
                    }
                }
            },
            "Api": {
                "Type": "AWS::ApiGateway::RestApi",
                "Properties": {
                    "Name": format!("{}-api", function_name),
                    "EndpointConfiguration": { "Types": ["REGIONAL"] }
                }
            },
            "ApiRootMethod": {
                "Type": "AWS::ApiGateway::Method",
                "Properties": {
                    "RestApiId": { "Ref": "Api" },
                    "ResourceId": { "Fn::GetAtt": ["Api", "RootResourceId"] },
                    "HttpMethod": "ANY",
                    "AuthorizationType": "NONE",
                    "Integration": proxy_integration.clone()
                }
            },
            "ApiProxyResource": {
                "Type": "AWS::ApiGateway::Resource",
                "Properties": {
                    "RestApiId": { "Ref": "Api" },
                    "ParentId": { "Fn::GetAtt": ["Api", "RootResourceId"] },
                    "PathPart": "{proxy+}"
                }
            },
            "ApiProxyMethod": {
                "Type": "AWS::ApiGateway::Method",
                "Properties": {
                    "RestApiId": { "Ref": "Api" },
                    "ResourceId": { "Ref": "ApiProxyResource" },
                    "HttpMethod": "ANY",
                    "AuthorizationType": "NONE",
                    "Integration": proxy_integration
                }
            },
            "ApiDeployment": {
                "Type": "AWS::ApiGateway::Deployment",
                "DependsOn": ["ApiRootMethod", "ApiProxyMethod"],
                "Properties": {
                    "RestApiId": { "Ref": "Api" },
                    "StageName": "prod"
                }
            },
            "ApiInvokePermission": {
                "Type": "AWS::Lambda::Permission",
                "Properties": {
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": { "Fn::GetAtt": ["Function", "Arn"] },
                    "Principal": "apigateway.amazonaws.com",
                    "SourceArn": {
                        "Fn::Sub": "arn:aws:execute-api:${AWS::Region}:${AWS::AccountId}:${Api}/*"
                    }
                }
            }
        },
        "Outputs": {
            "WebAppUrl": {
                "Description": "Web App URL (API Gateway)",
                "Value": {
                    "Fn::Sub": "https://${Api}.execute-api.${AWS::Region}.amazonaws.com/prod/"
                }
            },
            "AgentRuntimeArn": {
                "Description": "AgentCore Runtime ARN",
                "Value": { "Ref": "AgentRuntimeArn" }
            },
            "AgentRuntimeArnParameter": {
                "Description": "Parameter holding the AgentCore Runtime ARN",
                "Value": config.runtime_arn_param()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev() -> DeploymentConfig {
        DeploymentConfig::for_stage(StageName::Dev, Some("123456789012".into())).unwrap()
    }

    #[test]
    fn test_stage_parsing() {
        assert_eq!("dev".parse::<StageName>(), Ok(StageName::Dev));
        assert_eq!("prd".parse::<StageName>(), Ok(StageName::Prd));
        let err = "qa".parse::<StageName>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid stage name: qa. Must be one of: dev, prd");
    }

    #[test]
    fn test_account_required() {
        assert_eq!(
            DeploymentConfig::for_stage(StageName::Prd, None),
            Err(DeploymentError::MissingAccount)
        );
        assert_eq!(
            DeploymentConfig::for_stage(StageName::Prd, Some(" ".into())),
            Err(DeploymentError::MissingAccount)
        );
    }

    #[test]
    fn test_naming() {
        let config = dev();
        assert_eq!(
            config.runtime_arn_param(),
            "/dev/agent-core-playground/agent-core/runtime-arn"
        );
        assert_eq!(config.physical_prefix(), "d-acp");
        assert_eq!(config.stack_name(), "d-acp-main");
        assert_eq!(config.function_name(), "d-acp-web");
    }

    #[test]
    fn test_template_wires_parameter_and_streaming() {
        let template = render_template(&dev());
        let resources = &template["Resources"];

        let param = &resources["RuntimeArnParameter"];
        assert_eq!(param["Type"], "AWS::SSM::Parameter");
        assert_eq!(
            param["Properties"]["Name"],
            "/dev/agent-core-playground/agent-core/runtime-arn"
        );
        assert_eq!(param["Properties"]["Value"]["Ref"], "AgentRuntimeArn");
        assert_eq!(template["Parameters"]["AgentRuntimeArn"]["Type"], "String");
        assert_eq!(template["Outputs"]["AgentRuntimeArn"]["Value"]["Ref"], "AgentRuntimeArn");

        let env = &resources["Function"]["Properties"]["Environment"]["Variables"];
        assert_eq!(
            env["AGENT_RUNTIME_ARN_SSM_PARAM"],
            "/dev/agent-core-playground/agent-core/runtime-arn"
        );
        assert_eq!(env["AWS_LWA_INVOKE_MODE"], "response_stream");

        let statements =
            &resources["LambdaRole"]["Properties"]["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(
            statements[0]["Resource"][0],
            "arn:aws:ssm:ap-northeast-1:123456789012:parameter/dev/agent-core-playground/agent-core/runtime-arn"
        );
        assert_eq!(statements[1]["Action"][0], "bedrock-agentcore:InvokeAgentRuntime");

        assert_eq!(
            resources["ApiProxyMethod"]["Properties"]["Integration"]["ResponseTransferMode"],
            "STREAM"
        );
        assert_eq!(resources["ApiProxyResource"]["Properties"]["PathPart"], "{proxy+}");
        assert_eq!(resources["LogGroup"]["Properties"]["LogGroupName"], "/aws/lambda/d-acp-web");
    }
}
